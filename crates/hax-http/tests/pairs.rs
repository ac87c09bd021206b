use anyhow::Error;
use hax_http::{cookies, form, FieldError, FormError, Pairs};

#[test]
fn add_merges_existing_keys() {
    let mut pairs = Pairs::new();
    pairs.add("X", "1");
    pairs.add("Y", "a");
    pairs.add("X", "2");

    assert_eq!(pairs.get("X"), Some("1,2"));
    assert_eq!(pairs.len(), 2);

    let keys: Vec<_> = pairs.iter().map(|pair| pair.key.as_str()).collect();
    assert_eq!(keys, ["X", "Y"]);
}

#[test]
fn lookup_is_case_sensitive_first_match() {
    let mut pairs = Pairs::new();
    pairs.append("Key", "first");
    pairs.append("Key", "second");

    assert_eq!(pairs.get("Key"), Some("first"));
    assert_eq!(pairs.get("key"), None);

    assert_eq!(pairs.remove("Key").as_deref(), Some("first"));
    assert_eq!(pairs.get("Key"), Some("second"));
}

#[test]
fn fields_extracts_required_keys() -> Result<(), Error> {
    let pairs: Pairs = [("user", "ada"), ("pass", "secret")].into_iter().collect();

    let [user, pass] = pairs.fields(["user", "pass"], true)?;
    assert_eq!((user, pass), ("ada", "secret"));

    assert_eq!(
        pairs.fields(["user", "token"], false),
        Err(FieldError::MissingKey("token".to_string()))
    );
    assert_eq!(pairs.fields(["user"], true), Err(FieldError::ExtraPairs));
    assert!(pairs.fields(["user"], false).is_ok());

    Ok(())
}

#[test]
fn cookies_are_split_and_sanitized() {
    let pairs = cookies::parse("a=1;b=x y");

    let expected: Pairs = [("a", "1"), ("b", "x~y")].into_iter().collect();
    assert_eq!(pairs, expected);
}

#[test]
fn cookies_skip_separator_space_and_bare_segments() {
    let pairs = cookies::parse("session=abc; flag; theme=dark\"mode\"");

    let expected: Pairs = [("session", "abc"), ("theme", "dark~mode~")].into_iter().collect();
    assert_eq!(pairs, expected);
}

#[test]
fn cookies_format_round_trip() {
    let pairs: Pairs = [("a", "1"), ("b", "2")].into_iter().collect();
    let text = cookies::format(&pairs);

    assert_eq!(text, "a=1;b=2");
    assert_eq!(cookies::parse(&text), pairs);
    assert_eq!(cookies::format(&Pairs::new()), "");
}

#[test]
fn form_decodes_escapes() -> Result<(), Error> {
    let pairs = form::parse("a=1&b=%20x")?;
    let expected: Pairs = [("a", "1"), ("b", " x")].into_iter().collect();
    assert_eq!(pairs, expected);

    let pairs = form::parse("full+name=Ada+Lovelace&empty=")?;
    assert_eq!(pairs.get("full name"), Some("Ada Lovelace"));
    assert_eq!(pairs.get("empty"), Some(""));

    Ok(())
}

#[test]
fn form_rejects_malformed_input() {
    assert_eq!(form::parse("a=%2"), Err(FormError::InvalidEscape));
    assert_eq!(form::parse("a=%zz"), Err(FormError::InvalidEscape));
    assert_eq!(form::parse("a=1&b"), Err(FormError::MissingValue));
    assert_eq!(form::parse("a&b=1"), Err(FormError::MissingValue));
    assert_eq!(form::parse(""), Err(FormError::MissingValue));
    assert_eq!(form::parse("a=%ff"), Err(FormError::InvalidUtf8));
}
