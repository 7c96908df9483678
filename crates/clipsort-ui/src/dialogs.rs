// crates/clipsort-ui/src/dialogs.rs
//
// Blocking native message dialogs. Every user-facing error in ClipSort is
// surfaced synchronously through one of these two helpers; nothing is
// retried automatically and nothing is queued.

use rfd::{MessageButtons, MessageDialog, MessageLevel};

pub fn error(title: &str, text: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(text)
        .set_buttons(MessageButtons::Ok)
        .show();
}

pub fn info(title: &str, text: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title(title)
        .set_description(text)
        .set_buttons(MessageButtons::Ok)
        .show();
}
