use super::*;

fn parse(line: &str) -> Result<Option<Command>, String> {
    parse_command(line, Side::White, Difficulty::Standard)
}

#[test]
fn blank_line_is_nothing() {
    assert_eq!(parse("   "), Ok(None));
}

#[test]
fn new_match_uses_defaults_and_overrides() {
    assert_eq!(
        parse("new"),
        Ok(Some(Command::New { side: Side::White, difficulty: Difficulty::Standard }))
    );
    assert_eq!(
        parse("new black master"),
        Ok(Some(Command::New { side: Side::Black, difficulty: Difficulty::Master }))
    );
    assert_eq!(
        parse("NEW master b"),
        Ok(Some(Command::New { side: Side::Black, difficulty: Difficulty::Master }))
    );
    assert!(parse("new purple").is_err());
}

#[test]
fn moves_in_uci_form() {
    assert_eq!(parse("e2e4"), Ok(Some(Command::Move("e2e4".parse().unwrap()))));
    let Ok(Some(Command::Move(mv))) = parse("a7a8q") else {
        panic!("promotion move not parsed");
    };
    assert_eq!(mv.promotion, Some(Promotion::Queen));
}

#[test]
fn promotion_and_queries() {
    assert_eq!(parse("promote n"), Ok(Some(Command::Promote(Promotion::Knight))));
    assert!(parse("promote").is_err());
    assert!(parse("promote k").is_err());
    assert_eq!(parse("legal"), Ok(Some(Command::Legal(None))));
    assert_eq!(
        parse("legal g1"),
        Ok(Some(Command::Legal(Some("g1".parse().unwrap()))))
    );
    assert_eq!(parse("quit"), Ok(Some(Command::Quit)));
}

#[test]
fn gibberish_is_rejected() {
    let err = parse("castle").unwrap_err();
    assert!(err.contains("unknown command"));
}
