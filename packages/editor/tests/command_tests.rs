//! Format commands applied through a session

use scribe_editor::{
    BlockId, Caret, Color, EditSession, EditingContext, EditorConfig, EditorError, FontWeight,
    FormatChanged, FormatKind, LineSpacingPolicy, ModelError, SelectedSpan,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Session with three paragraphs: "alpha", "beta", "gamma"
fn three_paragraphs() -> (EditSession, EditingContext) {
    let (mut session, ctx) = EditSession::from_config(&EditorConfig::default()).unwrap();
    session.insert_text(&ctx, "alpha\nbeta\ngamma").unwrap();
    (session, ctx)
}

fn block_ids(session: &EditSession) -> Vec<BlockId> {
    session.document.model().blocks().iter().map(|b| b.id()).collect()
}

fn select_all(session: &mut EditSession) {
    let spans = block_ids(session).into_iter().map(SelectedSpan::whole).collect();
    session.select(spans).unwrap();
}

#[test]
fn test_italic_toggle_converges_on_mixed_selection() {
    let (mut session, mut ctx) = three_paragraphs();
    let ids = block_ids(&session);

    session.select(vec![SelectedSpan::whole(ids[1])]).unwrap();
    session.set_font_italic(&mut ctx, Some(true)).unwrap();

    // caret on upright text: the context is upright again
    session.move_caret(&mut ctx, Caret::new(ids[0], 0)).unwrap();
    assert!(!ctx.font().italic);

    select_all(&mut session);
    session.set_font_italic(&mut ctx, None).unwrap();
    for block in session.document.model().blocks() {
        assert!(block.runs().iter().all(|run| run.format.font.italic), "{}", block.text());
    }
    assert!(ctx.font().italic);

    session.set_font_italic(&mut ctx, None).unwrap();
    for block in session.document.model().blocks() {
        assert!(block.runs().iter().all(|run| !run.format.font.italic), "{}", block.text());
    }
}

#[test]
fn test_bold_toggle_follows_context_not_targets() {
    let (mut session, mut ctx) = three_paragraphs();
    let ids = block_ids(&session);

    session.select(vec![SelectedSpan::whole(ids[0])]).unwrap();
    session.set_font_weight(&mut ctx, Some(FontWeight::BOLD)).unwrap();
    assert!(ctx.font().weight.is_bold());

    // two of three blocks are already normal, the toggle still goes to normal
    select_all(&mut session);
    session.set_font_weight(&mut ctx, None).unwrap();

    for block in session.document.model().blocks() {
        assert!(block.runs().iter().all(|run| run.format.font.weight == FontWeight::NORMAL));
    }
    assert_eq!(ctx.font().weight, FontWeight::NORMAL);
}

#[test]
fn test_range_splits_runs() {
    let (mut session, mut ctx) = EditSession::from_config(&EditorConfig::default()).unwrap();
    session.insert_text(&ctx, "hello world").unwrap();
    let id = session.caret().block;

    session.select(vec![SelectedSpan::range(id, 6..11)]).unwrap();
    session.set_text_color(&mut ctx, Color::rgb(200, 0, 0)).unwrap();

    let block = session.document.model().block(id).unwrap();
    let runs: Vec<_> = block.runs().iter().map(|r| (r.text.as_str(), r.format.color)).collect();
    assert_eq!(
        runs,
        vec![("hello ", Color::BLACK), ("world", Color::rgb(200, 0, 0))]
    );

    // coloring the rest the same way merges the runs back
    session.select(vec![SelectedSpan::range(id, 0..6)]).unwrap();
    session.set_text_color(&mut ctx, Color::rgb(200, 0, 0)).unwrap();
    let block = session.document.model().block(id).unwrap();
    assert_eq!(block.runs().len(), 1);
    assert_eq!(block.text(), "hello world");
}

#[test]
fn test_selection_order_and_block_scope() {
    let (mut session, mut ctx) = three_paragraphs();
    let ids = block_ids(&session);

    // ranged span with a paragraph attribute affects the whole block
    session
        .select(vec![SelectedSpan::range(ids[2], 1..2), SelectedSpan::whole(ids[0])])
        .unwrap();
    session.set_line_spacing(&mut ctx, 2.5).unwrap();

    let model = session.document.model();
    assert_eq!(model.blocks()[0].line_spacing(), 2.5);
    assert_eq!(model.blocks()[1].line_spacing(), 1.0);
    assert_eq!(model.blocks()[2].line_spacing(), 2.5);
    assert_eq!(model.blocks()[2].runs().len(), 1);
    assert_eq!(ctx.block_format().line_spacing, 2.5);
}

#[test]
fn test_invalid_policy_changes_nothing() {
    let (mut session, mut ctx) = three_paragraphs();
    select_all(&mut session);

    let before_blocks = session.document.model().blocks().to_vec();
    let before_ctx = ctx.clone();
    let before_version = session.document.version;

    let result = session.set_line_spacing_policy(&mut ctx, Some("double"));
    assert!(matches!(
        result,
        Err(EditorError::Model(ModelError::InvalidPolicy(ref p))) if p == "double"
    ));

    assert_eq!(session.document.model().blocks(), before_blocks.as_slice());
    assert_eq!(ctx, before_ctx);
    assert_eq!(session.document.version, before_version);
}

#[test]
fn test_policy_toggle_and_explicit_value() {
    let (mut session, mut ctx) = three_paragraphs();
    let ids = block_ids(&session);
    session.select(vec![SelectedSpan::whole(ids[1])]).unwrap();

    session.set_line_spacing_policy(&mut ctx, None).unwrap();
    assert_eq!(
        session.document.model().blocks()[1].line_spacing_policy(),
        LineSpacingPolicy::Absolute
    );

    session.set_line_spacing_policy(&mut ctx, Some("Relative")).unwrap();
    assert_eq!(
        session.document.model().blocks()[1].line_spacing_policy(),
        LineSpacingPolicy::Relative
    );
    assert_eq!(ctx.block_format().line_spacing_policy, LineSpacingPolicy::Relative);
}

#[test]
fn test_unknown_title_level_changes_nothing() {
    let (mut session, mut ctx) = three_paragraphs();
    let before = session.document.model().blocks().to_vec();

    let result = session.set_title_level(&mut ctx, "Subtitle");
    assert!(matches!(
        result,
        Err(EditorError::Model(ModelError::UnknownTitleLevel(_)))
    ));
    assert_eq!(session.document.model().blocks(), before.as_slice());
}

#[test]
fn test_stale_selection_is_rejected() {
    let (mut session, mut ctx) = three_paragraphs();
    let ids = block_ids(&session);
    session.select(vec![SelectedSpan::whole(ids[0]), SelectedSpan::whole(ids[1])]).unwrap();

    // removed behind the session's back
    session.document.model_mut().remove_block(ids[1]).unwrap();
    let before = session.document.model().blocks().to_vec();

    let result = session.set_font_size(&mut ctx, 20);
    assert!(matches!(result, Err(EditorError::Model(ModelError::NotFound(_)))));
    assert_eq!(session.document.model().blocks(), before.as_slice());
}

#[test]
fn test_observers_receive_kind_and_format() {
    let (mut session, mut ctx) = three_paragraphs();
    let seen: Rc<RefCell<Vec<FormatChanged>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    session.subscribe(move |event: &FormatChanged| sink.borrow_mut().push(event.clone()));

    session.set_font_family(&mut ctx, "Serif").unwrap();
    session.set_background_color(&mut ctx, Some(Color::rgb(255, 255, 0))).unwrap();
    let _ = session.set_font_size(&mut ctx, 0);

    let seen = seen.borrow();
    let kinds: Vec<_> = seen.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![FormatKind::FontFamily, FormatKind::BackgroundColor]);
    assert_eq!(seen[1].format.run.font.family, "Serif");
    assert_eq!(seen[1].format.run.background, Some(Color::rgb(255, 255, 0)));
}
