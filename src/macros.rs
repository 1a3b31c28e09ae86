// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression (literal, &str, char slice owner...)
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

#[macro_export]
macro_rules! join {
    // Concatenate string-likes into a fresh String.
    ($first:expr $(, $rest:expr)+ $(,)?) => {{
        let mut s = ::std::string::String::from($first);
        $(
            s.push_str($rest);
        )+
        s
    }};
}

/// Push `$item` onto `$vec` unless an equal element is already there.
/// Keeps first-seen order, which the lecturer pools rely on.
#[macro_export]
macro_rules! push_unique {
    ($vec:expr, $item:expr) => {{
        let item = $item;
        if !$vec.contains(&item) {
            $vec.push(item);
            true
        } else {
            false
        }
    }};
}
