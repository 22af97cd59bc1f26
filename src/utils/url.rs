/// 把 id 編成可放進網址路徑的一段
pub fn encode_segment(raw: &str) -> String {
    // byte_serialize 把空白編成 '+'，路徑裡要用 %20
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_path_separators_and_spaces() {
        assert_eq!(encode_segment("shift-1"), "shift-1");
        assert_eq!(encode_segment("a/b?c d"), "a%2Fb%3Fc%20d");
        assert_eq!(encode_segment("1+1"), "1%2B1");
    }
}
