use campus_derive::campus_error;
use std::borrow::Cow;

#[campus_error]
pub enum FetchError {
    #[error("Parse error{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Missing record{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse_page(raw: &str) -> Result<u32, FetchError> {
    Ok(raw.parse::<u32>().context("Parsing page")?)
}

#[test]
fn source_errors_convert_with_context() {
    let err = parse_page("abc").unwrap_err();
    assert!(matches!(err, FetchError::Parse { context: Some(_), .. }));
    assert!(err.to_string().starts_with("Parse error (Parsing page): "));
}

#[test]
fn question_mark_converts_without_context() {
    fn inner() -> Result<u32, FetchError> {
        Ok("x".parse::<u32>()?)
    }
    let err = inner().unwrap_err();
    assert!(matches!(err, FetchError::Parse { context: None, .. }));
}

#[test]
fn context_is_attached_to_existing_errors() {
    let result: Result<(), FetchError> =
        Err(FetchError::Missing { message: "website".into(), context: None });
    let err = result.context("Loading website 1").unwrap_err();
    assert_eq!(err.to_string(), "Missing record (Loading website 1): website");
}

#[test]
fn strings_become_internal_errors() {
    let from_static: FetchError = "static failure".into();
    let from_owned: FetchError = String::from("owned failure").into();
    assert_eq!(from_static.to_string(), "Internal error: static failure");
    assert_eq!(from_owned.to_string(), "Internal error: owned failure");
}

#[test]
fn campus_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/campus_error_pass.rs");
}
