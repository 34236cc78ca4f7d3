use blockfall::core::{Board, GameState, ScriptedPieces};
use blockfall::term::{AnchorY, FrameBuffer, GameView, Rgb, Viewport};
use blockfall::types::{GameAction, GameMode, PieceKind};

fn screen_text(fb: &FrameBuffer) -> String {
    (0..fb.height())
        .map(|y| fb.row_text(y))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn term_view_renders_border_corners() {
    let snap = GameState::new(1).snapshot();
    let view = GameView::default();

    // 10 cells * 2 columns + border = 22 wide, 20 rows + border = 22 tall.
    let fb = view.render(&snap, Viewport::new(22, 22));

    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(21, 0).unwrap().ch, '┐');
    assert_eq!(fb.get(0, 21).unwrap().ch, '└');
    assert_eq!(fb.get(21, 21).unwrap().ch, '┘');
}

#[test]
fn term_view_renders_locked_cell_two_chars_wide_in_its_color() {
    let board = Board::from_rows(&["J........."]);
    let snap = GameState::with_board(board, ScriptedPieces::new(&[PieceKind::O])).snapshot();

    let fb = GameView::default().render(&snap, Viewport::new(22, 22));

    let (x0, y0) = (1, 1 + 19);
    for x in [x0, x0 + 1] {
        let cell = fb.get(x, y0).unwrap();
        assert_eq!(cell.ch, '█');
        assert_eq!(cell.style.fg, Rgb::new(0, 0, 255));
    }
    // Empty neighbor is a dim dot.
    assert_eq!(fb.get(x0 + 2, y0).unwrap().ch, '·');
}

#[test]
fn term_view_draws_active_piece_and_ghost() {
    let snap = GameState::with_source(ScriptedPieces::new(&[PieceKind::O])).snapshot();
    let fb = GameView::default().render(&snap, Viewport::new(22, 22));

    // O spawns at columns 4-5, rows 0-1; its ghost rests on rows 18-19.
    let col = 1 + 4 * 2;
    assert_eq!(fb.get(col, 1).unwrap().ch, '█');
    assert_eq!(fb.get(col, 2).unwrap().ch, '█');
    assert_eq!(fb.get(col, 1 + 18).unwrap().ch, '░');
    assert_eq!(fb.get(col + 3, 1 + 19).unwrap().ch, '░');
    assert_eq!(fb.get(col, 1 + 10).unwrap().ch, '·');
}

#[test]
fn term_view_draws_side_panel_when_wide_enough() {
    let mut snap = GameState::with_source(ScriptedPieces::new(&[PieceKind::T, PieceKind::I])).snapshot();
    snap.score = 1234;

    let fb = GameView::default()
        .with_anchor_y(AnchorY::Top)
        .render(&snap, Viewport::new(60, 24));
    let text = screen_text(&fb);

    assert!(text.contains("SCORE"));
    assert!(text.contains("1234"));
    assert!(text.contains("NEXT"));
    assert!(text.contains("rotate"));

    // Next is I: a single row of four blocks, eight columns wide.
    let next_row = (0..fb.height())
        .map(|y| fb.row_text(y))
        .position(|row| row.contains("NEXT"))
        .unwrap() as u16
        + 1;
    assert!(fb.row_text(next_row).contains("████████"));
}

#[test]
fn term_view_hides_panel_in_narrow_viewport() {
    let snap = GameState::new(3).snapshot();
    let fb = GameView::default().render(&snap, Viewport::new(30, 22));
    assert!(!screen_text(&fb).contains("SCORE"));
}

#[test]
fn term_view_game_over_overlay() {
    let mut game = GameState::with_source(ScriptedPieces::new(&[PieceKind::O]));
    let mut now = 0;
    while game.mode() == GameMode::Playing {
        now += 1_001;
        game.tick(now, &[GameAction::HardDrop]);
    }
    let snap = game.snapshot();

    let fb = GameView::default().render(&snap, Viewport::new(60, 24));
    let text = screen_text(&fb);
    assert!(text.contains("GAME OVER"));
    assert!(text.contains("SPACE to retry"));
    assert!(text.contains("Q to quit"));
}

#[test]
fn term_view_render_into_reuses_buffer() {
    let snap = GameState::new(9).snapshot();
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);

    view.render_into(&snap, Viewport::new(40, 22), &mut fb);
    assert_eq!((fb.width(), fb.height()), (40, 22));

    view.render_into(&snap, Viewport::new(80, 24), &mut fb);
    assert_eq!((fb.width(), fb.height()), (80, 24));
    assert_eq!(fb, view.render(&snap, Viewport::new(80, 24)));
}
