use super::*;
use crate::test_support::scripted_engine;
use engine_channel::EngineError;
use std::io::Cursor;

const AFTER_E2E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2";

fn settings() -> GameSettings {
    GameSettings::default()
}

#[test]
fn test_parse_input() {
    assert_eq!(parse_input("  e2e4\n"), Input::Move("e2e4"));
    assert_eq!(parse_input("quit\n"), Input::Quit);
    assert_eq!(parse_input("\n"), Input::Empty);
    assert_eq!(parse_input("fen\n"), Input::ShowFen);
    assert_eq!(
        parse_input("fen 8/8/8/8/8/8/8/8 w - - 0 1\n"),
        Input::SetFen("8/8/8/8/8/8/8/8 w - - 0 1")
    );
    assert_eq!(parse_input("board"), Input::Board);
    assert_eq!(parse_input("help"), Input::Help);
}

#[test]
fn test_human_then_engine_turn() {
    let (mut channel, sent) = scripted_engine("info depth 3 pv e7e5\nbestmove e7e5 ponder g1f3\n");
    let settings = settings();
    let mut session = GameSession::new(&mut channel, Position::startpos(), Color::White, &settings);

    let mut out = Vec::new();
    let outcome = session.run(Cursor::new("e2e4\nquit\n"), &mut out).unwrap();

    assert_eq!(outcome, GameOutcome::Quit);
    assert_eq!(
        session.position().to_fen(),
        "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3"
    );
    assert_eq!(
        sent.lines(),
        vec![format!("position fen {AFTER_E2E4}"), "go depth 3".to_string()]
    );

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Engine plays e7e5"));
    assert!(text.contains("4 . . . . P . . ."));

    let record = session.record();
    assert_eq!(record.moves.len(), 2);
    assert_eq!(record.moves[0].mover, Mover::Human);
    assert_eq!(record.moves[0].fen_after, AFTER_E2E4);
    assert_eq!(record.moves[1].mover, Mover::Engine);
    assert_eq!(record.moves[1].mv, "e7e5");
    assert_eq!(record.outcome, Some(GameOutcome::Quit));
    assert_eq!(record.final_fen.as_deref(), Some(session.position().to_fen().as_str()));
}

#[test]
fn test_engine_moves_first_when_human_is_black() {
    let (mut channel, sent) = scripted_engine("bestmove e2e4\n");
    let settings = GameSettings {
        depth: 7,
        ..settings()
    };
    let mut session = GameSession::new(&mut channel, Position::startpos(), Color::Black, &settings);

    let mut out = Vec::new();
    session.run(Cursor::new("quit\n"), &mut out).unwrap();

    assert_eq!(session.position().to_fen(), AFTER_E2E4);
    assert_eq!(
        sent.lines(),
        vec![
            format!("position fen {}", chess_core::STARTPOS_FEN),
            "go depth 7".to_string()
        ]
    );
    // Black sees its own pieces at the bottom
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("8 r n b k q b n r\n  h g f e d c b a\n"));
}

#[test]
fn test_malformed_input_is_rejected() {
    let (mut channel, sent) = scripted_engine("");
    let settings = settings();
    let mut session = GameSession::new(&mut channel, Position::startpos(), Color::White, &settings);

    let mut out = Vec::new();
    let outcome = session
        .run(Cursor::new("e9e4\nhello\nfen 8/8/8 w - - 0 1\n"), &mut out)
        .unwrap();

    // Input ran out: treated as quitting
    assert_eq!(outcome, GameOutcome::Quit);
    assert_eq!(session.position(), &Position::startpos());
    assert!(sent.lines().is_empty());

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Rejected: Malformed move 'e9e4'"));
    assert!(text.contains("Rejected: Malformed move 'hello'"));
    assert!(text.contains("Rejected: Malformed FEN"));
}

#[test]
fn test_set_position_informs_engine() {
    let (mut channel, sent) = scripted_engine("");
    let settings = settings();
    let mut session = GameSession::new(&mut channel, Position::startpos(), Color::White, &settings);

    let mut out = Vec::new();
    session
        .run(Cursor::new("fen 4k3/8/8/8/8/8/8/4K3 w - - 0 1\nfen\nquit\n"), &mut out)
        .unwrap();

    assert_eq!(sent.lines(), vec!["position fen 4k3/8/8/8/8/8/8/4K3 w - - 0 1"]);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Board position set."));
    assert!(text.contains("4k3/8/8/8/8/8/8/4K3 w - - 0 1\n"));
    assert_eq!(session.record().start_fen, "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
}

#[test]
fn test_validated_moves() {
    let perft = "a2a3: 1\ne2e4: 1\n\nNodes searched: 2\n";
    let script = format!("{perft}{perft}bestmove e7e5\n");
    let (mut channel, sent) = scripted_engine(&script);
    let settings = GameSettings {
        validate_moves: true,
        ..settings()
    };
    let mut session = GameSession::new(&mut channel, Position::startpos(), Color::White, &settings);

    let mut out = Vec::new();
    session
        .run(Cursor::new("e2e5\ne2e4\nquit\n"), &mut out)
        .unwrap();

    let start = format!("position fen {}", chess_core::STARTPOS_FEN);
    assert_eq!(
        sent.lines(),
        vec![
            start.clone(),
            "go perft 1".to_string(),
            start,
            "go perft 1".to_string(),
            format!("position fen {AFTER_E2E4}"),
            "go depth 3".to_string(),
        ]
    );
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Rejected: Illegal move: e2e5"));
    assert_eq!(session.position().fullmove_number, 3);
}

#[test]
fn test_engine_without_move_ends_game() {
    let (mut channel, _) = scripted_engine("bestmove (none)\n");
    let settings = settings();
    let mut session = GameSession::new(&mut channel, Position::startpos(), Color::Black, &settings);

    let mut out = Vec::new();
    let outcome = session.run(Cursor::new(""), &mut out).unwrap();
    assert_eq!(outcome, GameOutcome::EngineHasNoMove);
    assert!(String::from_utf8(out).unwrap().contains("Game over"));
}

#[test]
fn test_promotion_suffix_dropped() {
    let (mut channel, _) = scripted_engine("bestmove a7a8q\n");
    let settings = settings();
    let start = Position::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
    let mut session = GameSession::new(&mut channel, start, Color::Black, &settings);

    session.run(Cursor::new("quit\n"), Vec::new()).unwrap();
    assert_eq!(session.position().to_fen(), "P7/8/8/8/8/8/8/4K2k b - - 0 2");
}

#[test]
fn test_engine_disconnect_is_fatal() {
    let (mut channel, _) = scripted_engine("");
    let settings = settings();
    let mut session = GameSession::new(&mut channel, Position::startpos(), Color::White, &settings);

    let err = session
        .run(Cursor::new("e2e4\nquit\n"), Vec::new())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::Disconnected { .. })
    ));
}

#[test]
fn test_unknown_command_reply_is_fatal() {
    let (mut channel, _) = scripted_engine("Unknown command: 'go depth 3'\n");
    let settings = settings();
    let mut session = GameSession::new(&mut channel, Position::startpos(), Color::Black, &settings);

    let err = session.run(Cursor::new(""), Vec::new()).unwrap_err();
    assert!(err.to_string().contains("engine rejected the search"));
}

#[test]
fn test_choose_side() {
    let mut out = Vec::new();
    let side = choose_side(SideChoice::Ask, &mut Cursor::new("x\nb\n"), &mut out).unwrap();
    assert_eq!(side, Some(Color::Black));
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Choose your side (w/b): "));
    assert!(text.contains("Please answer w or b."));

    let side = choose_side(SideChoice::Ask, &mut Cursor::new(""), &mut Vec::new()).unwrap();
    assert_eq!(side, None);

    // Fixed choices never read input
    let mut input = Cursor::new("b\n");
    let side = choose_side(SideChoice::White, &mut input, &mut Vec::new()).unwrap();
    assert_eq!(side, Some(Color::White));
    assert_eq!(input.position(), 0);
}
