//! Path quoting for human-readable command lines.
//!
//! Tools are spawned with an argument vector, so nothing here is ever seen
//! by a shell. The quoted form shows up in `CommandSpec::display`, in
//! tracing output, and in spawn error messages.

/// Double every backslash and wrap the result in double quotes.
///
/// ```
/// use codeval_kernel::quote_path;
///
/// assert_eq!(quote_path(r"C:\src\Hello.java"), r#""C:\\src\\Hello.java""#);
/// assert_eq!(quote_path("hello.py"), "\"hello.py\"");
/// ```
pub fn quote_path(path: &str) -> String {
    let mut quoted = String::with_capacity(path.len() + 2);
    quoted.push('"');
    for c in path.chars() {
        if c == '\\' {
            quoted.push_str("\\\\");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('"');
    quoted
}
