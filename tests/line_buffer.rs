// tests/line_buffer.rs

use proptest::prelude::*;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use simrun::exec::LineBuffer;
use simrun::exec::process_runner::forward_lines;
use simrun::exec::ProcessEvent;
use simrun::types::StreamTag;

#[test]
fn splits_complete_lines_and_keeps_partial_tail() {
    let mut buf = LineBuffer::new();

    assert_eq!(buf.push(b"first\nsec"), vec!["first".to_string()]);
    assert!(buf.has_partial());

    assert_eq!(
        buf.push(b"ond\nthird\n"),
        vec!["second".to_string(), "third".to_string()]
    );
    assert!(!buf.has_partial());
    assert_eq!(buf.finish(), None);
}

#[test]
fn strips_carriage_returns_and_keeps_empty_lines() {
    let mut buf = LineBuffer::new();
    let lines = buf.push(b"a\r\n\r\nb\n\n");
    assert_eq!(lines, vec!["a", "", "b", ""]);
}

#[test]
fn finish_flushes_unterminated_line() {
    let mut buf = LineBuffer::new();
    assert!(buf.push(b"Run 42 complete").is_empty());
    assert_eq!(buf.finish().as_deref(), Some("Run 42 complete"));
    assert_eq!(buf.finish(), None);
}

#[test]
fn multibyte_characters_split_across_chunks_survive() {
    let text = "température 23°C\n".as_bytes();
    let mut buf = LineBuffer::new();
    let mut lines = Vec::new();
    for byte in text {
        lines.extend(buf.push(std::slice::from_ref(byte)));
    }
    assert_eq!(lines, vec!["température 23°C".to_string()]);
}

proptest! {
    #[test]
    fn chunk_boundaries_do_not_change_lines(
        lines in proptest::collection::vec("[a-zA-Z0-9{}\":#. ]{0,24}", 0..12),
        cuts in proptest::collection::vec(any::<usize>(), 0..8),
    ) {
        let mut stream = Vec::new();
        for line in &lines {
            stream.extend_from_slice(line.as_bytes());
            stream.push(b'\n');
        }

        let mut points: Vec<usize> = cuts
            .into_iter()
            .map(|c| if stream.is_empty() { 0 } else { c % stream.len() })
            .collect();
        points.push(0);
        points.push(stream.len());
        points.sort_unstable();
        points.dedup();

        let mut buf = LineBuffer::new();
        let mut got = Vec::new();
        for window in points.windows(2) {
            got.extend(buf.push(&stream[window[0]..window[1]]));
        }

        prop_assert_eq!(buf.finish(), None);
        prop_assert_eq!(got, lines);
    }
}

#[tokio::test]
async fn forward_lines_reassembles_lines_from_a_stream() {
    let (mut writer, reader) = tokio::io::duplex(64);
    let (tx, mut rx) = mpsc::channel(16);

    let reader_task = tokio::spawn(forward_lines(reader, StreamTag::Normal, tx));

    writer.write_all(b"{\"steps\":").await.unwrap();
    writer
        .write_all(b" 1}\nSimulation complete: /tmp/out\nlast")
        .await
        .unwrap();
    drop(writer);
    reader_task.await.unwrap();

    let mut lines = Vec::new();
    while let Some(event) = rx.recv().await {
        match event {
            ProcessEvent::Line(line) => {
                assert_eq!(line.tag, StreamTag::Normal);
                lines.push(line.text);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    assert_eq!(
        lines,
        vec![
            "{\"steps\": 1}".to_string(),
            "Simulation complete: /tmp/out".to_string(),
            "last".to_string(),
        ]
    );
}
