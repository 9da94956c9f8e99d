/// Builds a [`Params`](crate::db::Params) map from `name => value` pairs.
///
/// Names are written as identifiers and must match the `:name`
/// placeholders of the statement they are bound to. Values can be anything
/// convertible into [`SqlValue`](crate::db::SqlValue).
///
/// # Example
/// ```ignore
/// let params = params! { id => 5, year => 1999 };
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::db::Params::new()
    };
    ($($name:ident => $value:expr),+ $(,)?) => {{
        let mut params = $crate::db::Params::new();
        $( params.insert(stringify!($name), $value); )+
        params
    }};
}
