use pinyin::ToPinyin;

/// Transliterate a display name into a login-name stem.
///
/// Chinese characters become toneless pinyin; ASCII letters and digits are
/// kept lower-cased; everything else is dropped.
pub fn login_name_stem(user_name: &str) -> String {
    let mut stem = String::with_capacity(user_name.len());
    for c in user_name.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if let Some(p) = c.to_pinyin() {
            stem.push_str(p.plain());
        }
    }
    stem
}

/// Loose email shape check: one `@`, non-empty local part, dotted domain.
pub fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || s.chars().any(char::is_whitespace) {
        return false;
    }
    let mut labels = domain.split('.');
    let first_ok = labels.next().is_some_and(|l| !l.is_empty());
    let rest: Vec<&str> = labels.collect();
    first_ok && !rest.is_empty() && rest.iter().all(|l| !l.is_empty())
}
