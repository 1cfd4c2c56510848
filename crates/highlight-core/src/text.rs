/// Split `text` into lines on `\n`, dropping a trailing `\r` from each line.
///
/// Trailing empty segments are kept (N newlines => N+1 lines), which matches `Rope` line counts.
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}
