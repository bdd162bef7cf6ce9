//! Renders the static HTML archive and copies resolved media.
//!
//! HTML string construction and the CSS asset are external collaborators to
//! the core in spirit (§1) — this module is the thin seam where the core's
//! resolved `ChatData`/VFS meet actual markup, kept deliberately free of any
//! templating engine the rest of the pipeline doesn't otherwise need.

use crate::chat_data::{Chat, ChatData, ChatName};
use crate::file_id::FileId;
use crate::vfs::Vfs;
use rayon::prelude::*;
use std::fmt::Write as _;
use std::io;
use std::path::Path;

const DEFAULT_CSS: &str = include_str!("../assets/style.css");

/// Identifies the bundled CSS as a dependency, the same way a transcript or
/// media file is identified — by content-derived id, not by path alone.
pub fn css_file_id() -> FileId {
    FileId::create(0.0, DEFAULT_CSS.len() as u64, "style.css")
}

pub fn default_css() -> &'static str {
    DEFAULT_CSS
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn is_image(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    [".jpg", ".jpeg", ".png", ".gif", ".webp"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

fn is_video(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    [".mp4", ".mov", ".webm"].iter().any(|ext| lower.ends_with(ext))
}

fn page_shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{css}\n</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape(title),
        css = DEFAULT_CSS,
        body = body,
    )
}

fn render_top_index(data: &ChatData) -> String {
    let mut body = String::new();
    body.push_str("<h1>Chats</h1>\n<ul class=\"chat-list\">\n");
    for name in data.chats.keys() {
        let _ = writeln!(
            body,
            "<li><a href=\"{dir}/index.html\">{name}</a></li>",
            dir = escape(name.as_str()),
            name = escape(name.as_str()),
        );
    }
    body.push_str("</ul>\n");
    page_shell("Chats", &body)
}

fn render_chat_index(name: &ChatName, chat: &Chat) -> String {
    let mut body = String::new();
    let _ = write!(body, "<h1>{}</h1>\n<ul class=\"year-list\">\n", escape(name.as_str()));
    for year in chat.output_files.keys() {
        let _ = writeln!(body, "<li><a href=\"{year}.html\">{year}</a></li>");
    }
    body.push_str("</ul>\n<p><a href=\"../index.html\">All chats</a></p>\n");
    page_shell(name.as_str(), &body)
}

fn render_year_page(
    name: &ChatName,
    year: i32,
    chat: &Chat,
    media_dependencies: &std::collections::BTreeMap<String, Option<FileId>>,
) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{} — {year}</h1>", escape(name.as_str()));
    for msg in chat.messages.iter().filter(|m| m.year == year) {
        let _ = write!(
            body,
            "<div class=\"message\"><div class=\"meta\"><span class=\"sender\">{sender}</span> {timestamp}</div><div class=\"content\">{content}</div>",
            sender = escape(&msg.sender),
            timestamp = escape(&msg.timestamp),
            content = escape(&msg.content),
        );
        if let Some(media_name) = &msg.media_name {
            let resolved = media_dependencies.get(media_name).cloned().flatten();
            match resolved {
                Some(_) if is_image(media_name) => {
                    let _ = write!(body, "<img src=\"media/{}\" alt=\"{}\">", escape(media_name), escape(media_name));
                }
                Some(_) if is_video(media_name) => {
                    let _ = write!(
                        body,
                        "<video controls src=\"media/{}\"></video>",
                        escape(media_name)
                    );
                }
                Some(_) => {
                    let _ = write!(body, "<a href=\"media/{0}\">{0}</a>", escape(media_name));
                }
                None => {
                    let _ = write!(body, "<span class=\"missing-media\">missing: {}</span>", escape(media_name));
                }
            }
        }
        body.push_str("</div>\n");
    }
    body.push_str(&format!("<p><a href=\"index.html\">{} index</a></p>\n", escape(name.as_str())));
    page_shell(&format!("{} — {year}", name.as_str()), &body)
}

/// Write the full archive to `output_root`: the top-level index and every
/// chat's index are always regenerated (cheap); year pages are only
/// re-emitted when their `OutputFile.regenerate` flag is set, and their
/// media is (re-)copied at that time.
pub fn emit(data: &ChatData, vfs: &Vfs, output_root: &Path) -> io::Result<()> {
    std::fs::create_dir_all(output_root)?;
    std::fs::write(output_root.join("index.html"), render_top_index(data))?;

    data.chats
        .par_iter()
        .map(|(name, chat)| emit_chat(name, chat, vfs, output_root))
        .collect::<Result<Vec<()>, io::Error>>()?;

    Ok(())
}

fn emit_chat(name: &ChatName, chat: &Chat, vfs: &Vfs, output_root: &Path) -> io::Result<()> {
    let chat_dir = output_root.join(name.as_str());
    std::fs::create_dir_all(&chat_dir)?;
    std::fs::write(chat_dir.join("index.html"), render_chat_index(name, chat))?;

    chat.output_files
        .par_iter()
        .filter(|(_, output_file)| output_file.regenerate)
        .map(|(year, output_file)| {
            let page = render_year_page(name, *year, chat, &output_file.media_dependencies);
            std::fs::write(chat_dir.join(format!("{year}.html")), page)?;
            copy_media(output_file, vfs, &chat_dir)
        })
        .collect::<Result<Vec<()>, io::Error>>()?;

    Ok(())
}

fn copy_media(
    output_file: &crate::chat_data::OutputFile,
    vfs: &Vfs,
    chat_dir: &Path,
) -> io::Result<()> {
    let media_dir = chat_dir.join("media");
    let has_media = output_file.media_dependencies.values().any(|v| v.is_some());
    if !has_media {
        return Ok(());
    }
    std::fs::create_dir_all(&media_dir)?;

    for (name, id) in &output_file.media_dependencies {
        let Some(id) = id else { continue };
        let Some(handle) = vfs.by_id(id) else {
            tracing::warn!(media = %name, "resolved media id not found in VFS, skipping copy");
            continue;
        };
        match vfs.open(&handle) {
            Ok((mut reader, _)) => {
                let mut out = std::fs::File::create(media_dir.join(name))?;
                io::copy(&mut reader, &mut out)?;
            }
            Err(err) => {
                tracing::warn!(media = %name, %err, "could not open media for copying");
            }
        }
    }
    Ok(())
}
