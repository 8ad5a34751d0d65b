//! Helpers shared by the commands

pub mod callback;
pub mod command_helpers;
pub mod logging;

pub use callback::{callback_channel, CallbackReceiver, ChannelCallback};
pub use command_helpers::execute_logged;
