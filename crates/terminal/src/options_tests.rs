use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn no_arguments_gives_defaults() {
    let options = parse_args(&[]).unwrap().unwrap();
    assert_eq!(options, Options::default());
    assert_eq!(options.difficulty, Difficulty::Standard);
}

#[test]
fn all_flags() {
    let options = parse_args(&args(&[
        "--config", "match.toml", "-e", "/usr/games/stockfish", "--side", "black", "-d", "master", "--json",
    ]))
    .unwrap()
    .unwrap();
    assert_eq!(options.config, Some(PathBuf::from("match.toml")));
    assert_eq!(options.engine, Some(PathBuf::from("/usr/games/stockfish")));
    assert_eq!(options.side, Some(Side::Black));
    assert_eq!(options.difficulty, Difficulty::Master);
    assert!(options.json);
}

#[test]
fn help_short_circuits() {
    assert_eq!(parse_args(&args(&["--json", "--help"])).unwrap(), None);
}

#[test]
fn bad_input_is_reported() {
    assert!(parse_args(&args(&["--side"])).is_err());
    assert!(parse_args(&args(&["--side", "green"])).is_err());
    assert!(parse_args(&args(&["--difficulty", "grandmaster"])).is_err());
    assert!(parse_args(&args(&["--fast"])).is_err());
}
