//! End-to-end scenarios for the chat-archive pipeline, mirroring the
//! literal cases a reviewer would check by hand.

use chatarchive_core::run;
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::io::Write;
use std::path::Path;

fn write_chat(path: &Path, content: &str, mtime_secs: i64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    set_file_mtime(path, FileTime::from_unix_time(mtime_secs, 0)).unwrap();
}

const BASIC: &str = "[12.3.2022 klo 14.08.18] Space Rocket: Test chat\n\
                      [12.3.2022 klo 14.09.09] Matias Virtanen: Hello world";

#[test]
fn basic_run_produces_one_chat_one_year_two_messages() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_chat(&input.path().join("Space Rocket/_chat.txt"), BASIC, 1000);

    run(input.path(), output.path(), "2024-01-01").unwrap();

    assert!(output.path().join("Space Rocket/2022.html").exists());
    let page = fs::read_to_string(output.path().join("Space Rocket/2022.html")).unwrap();
    assert!(page.contains("Hello world"));
    assert!(page.contains("Matias Virtanen"));
}

#[test]
fn duplicated_backup_dedups_to_identical_output() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_chat(&input.path().join("backup-a/_chat.txt"), BASIC, 1000);
    write_chat(&input.path().join("backup-b/_chat.txt"), BASIC, 2000);

    run(input.path(), output.path(), "2024-01-01").unwrap();

    let data = chatarchive_core::state_store::load(output.path());
    let chat = &data.chats[&chatarchive_core::ChatName::new("Space Rocket")];
    assert_eq!(chat.messages.len(), 2, "identical backups must dedup, not double messages");
}

#[test]
fn overlapping_backups_merge_in_order_without_duplicating_the_overlap() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let mut lines_a = Vec::new();
    let mut lines_b = Vec::new();
    for i in 1..=21 {
        let line = format!("[1.1.2021 klo 09.{i:02}.00] Alice: line {i}");
        if i <= 13 {
            lines_a.push(line.clone());
        }
        if i == 1 || i >= 12 {
            lines_b.push(line);
        }
    }
    write_chat(&input.path().join("backup-a/_chat.txt"), &lines_a.join("\n"), 1000);
    write_chat(&input.path().join("backup-b/_chat.txt"), &lines_b.join("\n"), 2000);

    run(input.path(), output.path(), "2024-01-01").unwrap();

    let data = chatarchive_core::state_store::load(output.path());
    let chat = &data.chats[&chatarchive_core::ChatName::new("Alice")];
    assert_eq!(chat.messages.len(), 21);
    for (i, msg) in chat.messages.iter().enumerate() {
        assert_eq!(msg.content, format!("line {}", i + 1));
    }
}

#[test]
fn zip_input_produces_identical_output_to_plain_transcript() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let zip_path = input.path().join("export.zip");
    let file = fs::File::create(&zip_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    writer.start_file("_chat.txt", options).unwrap();
    writer.write_all(BASIC.as_bytes()).unwrap();
    writer.finish().unwrap();

    run(input.path(), output.path(), "2024-01-01").unwrap();

    let page = fs::read_to_string(output.path().join("Space Rocket/2022.html")).unwrap();
    assert!(page.contains("Hello world"));
}

#[test]
fn invalid_syntax_lines_fold_as_continuations_without_crashing() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let content = "[1.1.2021 klo 09.00.00] Alice: opening message\n\
                    no brackets at all here\n\
                    [] empty time\n\
                    [1.1.abcd klo 09.00.00] Alice: non numeric year line\n\
                    [unclosed bracket continues on\n\
                    [1.1.2021 klo 09.05.00] Bob: closing message";
    write_chat(&input.path().join("chat/_chat.txt"), content, 1000);

    run(input.path(), output.path(), "2024-01-01").unwrap();

    let data = chatarchive_core::state_store::load(output.path());
    let chat = &data.chats[&chatarchive_core::ChatName::new("Alice")];
    assert_eq!(chat.messages.len(), 2);
    assert!(chat.messages[0].content.contains("opening message"));
    assert!(chat.messages[0].content.contains("no brackets at all here"));
    assert_eq!(chat.messages[1].sender, "Bob");
}

#[test]
fn incremental_no_op_run_rewrites_nothing_and_backs_up_prior_state() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_chat(&input.path().join("Space Rocket/_chat.txt"), BASIC, 1000);

    run(input.path(), output.path(), "2024-01-01").unwrap();
    let first_state = fs::read_to_string(output.path().join("chat-data.json")).unwrap();
    let year_page_mtime = fs::metadata(output.path().join("Space Rocket/2022.html"))
        .unwrap()
        .modified()
        .unwrap();

    std::thread::sleep(std::time::Duration::from_millis(10));
    run(input.path(), output.path(), "2024-01-02").unwrap();

    let backup = fs::read_to_string(output.path().join("chat-data-BACKUP.json")).unwrap();
    assert_eq!(backup, first_state);
    let new_mtime = fs::metadata(output.path().join("Space Rocket/2022.html"))
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(year_page_mtime, new_mtime);
}
