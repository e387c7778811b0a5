use deck_users::User;

/// Title underlined to its own width.
#[inline]
pub fn heading(title: &str) -> String {
    let width = title.chars().count();
    format!("{title}\n{}", "=".repeat(width))
}

/// `value`, or `placeholder` when missing or blank.
#[inline]
pub fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => placeholder,
    }
}

/// One-letter avatar, as the card view shows it.
pub fn avatar(user: &User) -> String {
    match user.initial() {
        Some(c) => format!("({c})"),
        None => "(?)".to_string(),
    }
}

/// `Total: 10 | Filtered: 3`
pub fn counts_line(total_label: &str, total: usize, filtered_label: &str, filtered: usize) -> String {
    format!("{total_label}: {total} | {filtered_label}: {filtered}")
}

/// Fill `{n}` in a translated template.
#[inline]
pub fn fill_count(template: &str, n: u64) -> String {
    template.replace("{n}", &n.to_string())
}

/// One list row: avatar, name, username and email.
pub fn user_row(user: &User) -> String {
    format!(
        "{:>3} {} {} (@{}) <{}>",
        user.id,
        avatar(user),
        user.name,
        user.username,
        user.email
    )
}
