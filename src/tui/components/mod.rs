// Components module - the panels and overlays the chat view is built from
//
// - Conversation list: sidebar, select/open/delete conversations
// - Transcript: the open conversation, auto-following the reply
// - Composer: prompt input
// - Status bar: session state, active conversation, key hints
// - Toast: transient notifications

pub mod composer;
pub mod conversation_list;
pub mod scrollbar;
pub mod status_bar;
pub mod toast;
pub mod transcript;

pub use composer::{Composer, ComposerAction};
pub use conversation_list::{ConversationList, ListAction};
pub use toast::Toast;
pub use transcript::TranscriptPanel;
