use gantry_core::{Engine, EngineBuilder, Plan, StreamSession};

/// A launch plan with a forward-referenced milestone and a cross-section
/// dependency.
pub const LAUNCH: &str = "\
# Launch plan

Some prose before the chart.

```mermaid
gantt
    title Website Launch
    dateFormat YYYY-MM-DD
    section Design
    Go live :milestone, live, after qa
    Wireframes :wf, 2025-03-03, 3d
    Visuals :vis, after wf, 4d
    section Build
    Frontend :fe, after vis, 5d
    QA :qa, after fe, 2d
```
";

/// Streams `text` through a fresh session and engine in `chunk_size`
/// character fragments, draining after every fragment.
pub async fn stream_plan(text: &str, chunk_size: usize) -> (Engine, StreamSession) {
    let engine = EngineBuilder::new()
        .build()
        .expect("Failed to build engine");
    let mut session = StreamSession::new();
    let chars: Vec<char> = text.chars().collect();
    for piece in chars.chunks(chunk_size) {
        let fragment: String = piece.iter().collect();
        engine.enqueue(session.consume(&fragment).actions);
        engine.drain().await.expect("Failed to drain");
    }
    engine.enqueue(session.finish().actions);
    engine.drain().await.expect("Failed to drain");
    (engine, session)
}

/// Streams `text` in one fragment and returns the plan.
pub async fn plan_of(text: &str) -> Plan {
    let (engine, _) = stream_plan(text, text.len().max(1)).await;
    engine.plan()
}
