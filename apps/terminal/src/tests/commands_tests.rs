use super::*;

#[test]
fn blank_lines_are_empty() {
    assert_eq!(parse("   "), Err(CommandError::Empty));
}

#[test]
fn login_needs_both_credentials() {
    assert_eq!(
        parse("login alice hunter2"),
        Ok(Command::Login {
            username: "alice".into(),
            password: "hunter2".into(),
        })
    );
    assert_eq!(
        parse("login alice"),
        Err(CommandError::Usage("login <username> <password>"))
    );
}

#[test]
fn register_accepts_optional_display_name_and_email() {
    assert_eq!(
        parse("register dana pw"),
        Ok(Command::Register {
            username: "dana".into(),
            password: "pw".into(),
            display_name: None,
            email: None,
        })
    );
    assert_eq!(
        parse("register dana pw Dana dana@example.com"),
        Ok(Command::Register {
            username: "dana".into(),
            password: "pw".into(),
            display_name: Some("Dana".into()),
            email: Some("dana@example.com".into()),
        })
    );
    assert!(matches!(
        parse("register dana pw a b c"),
        Err(CommandError::Usage(_))
    ));
}

#[test]
fn bare_five_letter_word_is_a_guess() {
    assert_eq!(parse("crane"), Ok(Command::Guess("crane".into())));
    assert_eq!(parse("guess cr4ne"), Ok(Command::Guess("cr4ne".into())));
}

#[test]
fn command_names_win_over_bare_guesses() {
    assert_eq!(parse("START"), Ok(Command::Start));
    assert_eq!(parse("rules"), Ok(Command::Rules));
    assert_eq!(parse("board"), Ok(Command::Board));
    assert_eq!(parse("guess start"), Ok(Command::Guess("start".into())));
}

#[test]
fn profile_subcommands() {
    assert_eq!(parse("profile"), Ok(Command::Profile));
    assert_eq!(
        parse("profile set Ally ally@example.com"),
        Ok(Command::ProfileSet {
            display_name: "Ally".into(),
            email: Some("ally@example.com".into()),
        })
    );
    assert!(matches!(parse("profile edit"), Err(CommandError::Usage(_))));
}

#[test]
fn unknown_words_are_reported() {
    assert_eq!(parse("dance now"), Err(CommandError::Unknown("dance".into())));
    assert_eq!(parse("cats"), Err(CommandError::Unknown("cats".into())));
}

#[test]
fn log_names_hide_arguments() {
    let command = parse("login alice hunter2").expect("login");
    assert_eq!(command.name(), "login");
    assert!(!command.name().contains("hunter2"));
}
