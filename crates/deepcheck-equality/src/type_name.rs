//! Canonical short type names

/// `std::any::type_name` with module paths stripped
///
/// `alloc::vec::Vec<my_crate::Point>` becomes `Vec<Point>` and
/// `&my_crate::Point` becomes `&Point`, so a reference to a record is named
/// distinctly from the record itself.
pub fn short_type_name<T: ?Sized>() -> String {
    shorten(std::any::type_name::<T>())
}

/// Strip every `path::` qualifier from a type name
pub fn shorten(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    // Start of the identifier path currently being written
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
            continue;
        }
        out.push(c);
        if !(c.is_alphanumeric() || c == '_') {
            segment_start = out.len();
        }
    }

    out
}
