//! Compares each new `(chat, year)`'s dependencies against the previous
//! generation and sets the regenerate flag accordingly.

use crate::chat_data::ChatData;

/// Set `regenerate` on every `OutputFile` in `new_data`, comparing against
/// `previous`. No old record for a `(chat, year)` always regenerates;
/// otherwise regeneration is triggered by any difference in
/// `css_dependency`, `media_dependencies`, or `chat_dependencies`.
pub fn check(new_data: &mut ChatData, previous: &ChatData) {
    for (name, chat) in new_data.chats.iter_mut() {
        let old_chat = previous.chats.get(name);
        for (year, output_file) in chat.output_files.iter_mut() {
            let old_output_file = old_chat.and_then(|c| c.output_files.get(year));
            output_file.regenerate = match old_output_file {
                None => true,
                Some(old) => {
                    old.css_dependency != output_file.css_dependency
                        || old.media_dependencies != output_file.media_dependencies
                        || old.chat_dependencies != output_file.chat_dependencies
                }
            };
        }
    }
}
