//! Turn event records into narrative text, and summarize graph answers.

use super::model::{Event, GraphAnswer, MetaEvent};

/// Render events as one sentence each, in input order, joined by spaces.
///
/// An empty slice yields an empty string.
pub fn create_story_text(events: &[Event]) -> String {
    events.iter().map(event_sentence).collect::<Vec<_>>().join(" ")
}

/// Like [`create_story_text`], followed by one sentence per meta-event.
///
/// Meta-events only summarize events, so with no events the story is empty.
pub fn create_story_text_with_meta(events: &[Event], meta_events: &[MetaEvent]) -> String {
    if events.is_empty() {
        return String::new();
    }
    events
        .iter()
        .map(event_sentence)
        .chain(meta_events.iter().map(meta_sentence))
        .collect::<Vec<_>>()
        .join(" ")
}

fn event_sentence(event: &Event) -> String {
    let mut sentence = format!(
        "On {}, at {}, {} participated in {}.",
        event.date, event.location, event.actor, event.activity
    );
    let description = event.description.trim();
    if !description.is_empty() {
        sentence.push(' ');
        sentence.push_str(description);
        if !description.ends_with(['.', '!', '?']) {
            sentence.push('.');
        }
    }
    sentence
}

fn meta_sentence(meta: &MetaEvent) -> String {
    match &meta.details {
        Some(event) => event_sentence(event),
        None => {
            let summary = meta.summary.trim();
            if summary.ends_with(['.', '!', '?']) {
                summary.to_string()
            } else {
                format!("{summary}.")
            }
        }
    }
}

/// Length statistics over a set of graph answers.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerStats {
    pub total: usize,
    pub mean_len: f64,
    pub min_len: usize,
    pub max_len: usize,
}

impl std::fmt::Display for AnswerStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total answers: {}", self.total)?;
        writeln!(f, "Average answer length: {:.1} characters", self.mean_len)?;
        writeln!(f, "Shortest answer: {} characters", self.min_len)?;
        write!(f, "Longest answer: {} characters", self.max_len)
    }
}

/// Compute answer length statistics; `None` when there are no answers.
pub fn analyze_graph_answers(answers: &[GraphAnswer]) -> Option<AnswerStats> {
    let lengths: Vec<usize> = answers.iter().map(GraphAnswer::len).collect();
    let min_len = *lengths.iter().min()?;
    let max_len = *lengths.iter().max()?;
    Some(AnswerStats {
        total: lengths.len(),
        mean_len: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
        min_len,
        max_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> Vec<Event> {
        vec![
            Event::new("2024-01-01", "Park", "Alice", "Meeting", "She waved at the fountain"),
            Event::new("2024-02-01", "Cafe", "Bob", "Lunch", "Soup was served."),
            Event::new("2024-03-01", "Harbor", "Carol", "Sailing", "Wind picked up!"),
        ]
    }

    #[test]
    fn empty_events_give_empty_story() {
        assert_eq!(create_story_text(&[]), "");
    }

    #[test]
    fn one_sentence_per_event() {
        let story = create_story_text(&events()[..1]);
        assert_eq!(
            story,
            "On 2024-01-01, at Park, Alice participated in Meeting. She waved at the fountain."
        );
    }

    #[test]
    fn terminal_punctuation_is_not_doubled() {
        let story = create_story_text(&events());
        assert!(story.contains("Soup was served. On 2024-03-01"));
        assert!(story.ends_with("Wind picked up!"));
        assert!(!story.contains(".."));
    }

    #[test]
    fn order_preserved_and_each_field_once() {
        let evs = events();
        let story = create_story_text(&evs);
        let mut last = 0;
        for event in &evs {
            assert_eq!(story.matches(event.actor.as_str()).count(), 1);
            let desc = event.description.trim_end_matches(['.', '!']);
            assert_eq!(story.matches(desc).count(), 1);
            let pos = story.find(event.actor.as_str()).unwrap();
            assert!(pos >= last);
            last = pos;
        }
    }

    #[test]
    fn meta_events_follow_events() {
        let metas = vec![
            MetaEvent {
                summary: "A season of new friendships".into(),
                event_ids: vec![0, 1],
                details: None,
            },
            MetaEvent {
                summary: "Regatta: Carol won".into(),
                event_ids: vec![],
                details: Some(Event::new("2024-04-01", "Bay", "Carol", "Regatta", "Carol won")),
            },
        ];
        let story = create_story_text_with_meta(&events()[..1], &metas);
        assert!(story.starts_with("On 2024-01-01"));
        assert!(story.contains("fountain. A season of new friendships. On 2024-04-01, at Bay"));
        assert!(story.ends_with("Carol won."));
    }

    #[test]
    fn meta_events_alone_give_empty_story() {
        let metas = vec![MetaEvent {
            summary: "A season of friendship".into(),
            event_ids: vec![],
            details: None,
        }];
        assert_eq!(create_story_text_with_meta(&[], &metas), "");
    }

    #[test]
    fn answer_stats() {
        let answers = vec![
            GraphAnswer::parse("a.json", "\"abcd\""),
            GraphAnswer::parse("b.json", "\"ab\""),
        ];
        let stats = analyze_graph_answers(&answers).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.min_len, 2);
        assert_eq!(stats.max_len, 4);
        assert!((stats.mean_len - 3.0).abs() < f64::EPSILON);
        assert!(stats.to_string().contains("Average answer length: 3.0 characters"));
        assert!(analyze_graph_answers(&[]).is_none());
    }
}
