use std::borrow::Cow;

pub(crate) fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    // Rich-text hosts only ever store `\n`; CRLF/CR from pasted or loaded text is folded so that
    // every line break is exactly one character in offset arithmetic.
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}
