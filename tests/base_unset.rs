use loose_uri::{
    base::{self, SetDefaultError},
    Uri,
};

// Runs in its own binary so that nothing has fixed the default beforehand.
#[test]
fn falls_back_to_root() {
    assert_eq!(Uri::new(), Uri::default());
    assert_eq!(Uri::new().to_string(), "/");
    assert_eq!(base::default_uri(), base::FALLBACK);
    assert_eq!(base::default_uri(), "/");

    // Reading the default fixes it.
    assert_eq!(
        base::set_default("https://late.example.com/"),
        Err(SetDefaultError::AlreadySet)
    );
    assert_eq!(base::default_uri(), "/");
}
