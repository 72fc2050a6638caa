/// `re!(name, pattern)` declares `fn name() -> &'static Regex`, compiled on
/// first use.
#[macro_export]
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static $crate::__regex::Regex {
            static R: ::std::sync::OnceLock<$crate::__regex::Regex> = ::std::sync::OnceLock::new();
            R.get_or_init(|| $crate::__regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}
