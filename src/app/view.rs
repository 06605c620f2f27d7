use interlinear_core::session::ReaderPhase;
use interlinear_core::{ReaderSnapshot, reader::PageTransition};
use serde::Serialize;

const PROGRESS_BAR_WIDTH: usize = 20;

#[derive(Serialize)]
struct JsonFrame<'a> {
    action: &'a str,
    snapshot: &'a ReaderSnapshot,
}

/// One JSON line per frame for an external presentation layer.
pub fn render_json(action: &str, snapshot: &ReaderSnapshot) -> serde_json::Result<String> {
    serde_json::to_string(&JsonFrame { action, snapshot })
}

pub fn render_text(snapshot: &ReaderSnapshot) -> String {
    let mut out = String::new();
    let arrow = match snapshot.transition {
        PageTransition::Forward => " >>",
        PageTransition::Backward => " <<",
        PageTransition::None => "",
    };
    out.push_str(&format!(
        "== {} | page {}/{}{} ==\n",
        snapshot.document_name,
        snapshot.current_page + 1,
        snapshot.total_pages,
        arrow
    ));

    if snapshot.no_content {
        out.push_str("(no content)\n");
    } else if snapshot.pairs.is_empty() && snapshot.phase == ReaderPhase::Loading {
        out.push_str("(loading...)\n");
    }
    for pair in &snapshot.pairs {
        out.push_str(&pair.source);
        out.push('\n');
        out.push_str("    ");
        out.push_str(&pair.translation);
        out.push_str("\n\n");
    }

    if snapshot.overlay_visible {
        out.push_str(&overlay(snapshot));
    } else if !snapshot.progress.is_complete() {
        out.push_str(&format!(
            "-- translated {}/{} --\n",
            snapshot.progress.processed, snapshot.progress.total
        ));
    }
    if let Some(error) = &snapshot.feed_error {
        out.push_str(&format!("!! translation stopped: {error}\n"));
    }
    out
}

fn overlay(snapshot: &ReaderSnapshot) -> String {
    let filled = (snapshot.progress_fraction * PROGRESS_BAR_WIDTH as f32).round() as usize;
    let filled = filled.min(PROGRESS_BAR_WIDTH);
    let phase = match snapshot.phase {
        ReaderPhase::Loading => "loading",
        ReaderPhase::Ready => "ready",
    };
    format!(
        "+-- font {}px | margin {}px | {} --+\n[{}{}] {:.0}% translated\n<- p | n -> | g N | +/- font | m+/m- margin | esc close\n",
        snapshot.params.font_size,
        snapshot.params.margin,
        phase,
        "#".repeat(filled),
        ".".repeat(PROGRESS_BAR_WIDTH - filled),
        snapshot.progress_fraction * 100.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use interlinear_core::SentencePair;
    use interlinear_core::feed::FeedProgress;
    use interlinear_core::pagination::DisplayParams;

    fn snapshot() -> ReaderSnapshot {
        ReaderSnapshot {
            document_name: "cuentos.pdf".to_string(),
            current_page: 1,
            total_pages: 4,
            pairs: vec![SentencePair::new("Hola.", "Hello.")],
            overlay_visible: false,
            params: DisplayParams::default(),
            phase: ReaderPhase::Ready,
            transition: PageTransition::Forward,
            progress: FeedProgress::new(50, 200),
            progress_fraction: 0.25,
            feed_error: None,
            no_content: false,
        }
    }

    #[test]
    fn text_frame_shows_page_and_pairs() {
        let text = render_text(&snapshot());
        assert!(text.starts_with("== cuentos.pdf | page 2/4 >> ==\n"));
        assert!(text.contains("Hola.\n    Hello.\n"));
        assert!(text.contains("-- translated 50/200 --"));
    }

    #[test]
    fn overlay_shows_progress_bar() {
        let mut snap = snapshot();
        snap.overlay_visible = true;
        let text = render_text(&snap);
        assert!(text.contains("[#####...............] 25% translated"));
        assert!(text.contains("font 18px | margin 24px | ready"));
    }

    #[test]
    fn empty_document_says_so() {
        let mut snap = snapshot();
        snap.pairs.clear();
        snap.no_content = true;
        assert!(render_text(&snap).contains("(no content)"));
    }

    #[test]
    fn json_frame_carries_action() {
        let line = render_json("reader_next_page", &snapshot()).expect("json");
        let value: serde_json::Value = serde_json::from_str(&line).expect("parse");
        assert_eq!(value["action"], "reader_next_page");
        assert_eq!(value["snapshot"]["pairs"][0][1], "Hello.");
        assert_eq!(value["snapshot"]["phase"], "ready");
    }
}
