//! Glob matching for member names.
//!
//! Follows `fnmatch(3)` without flags:
//! - `*` matches any run of characters, including none
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]`, `[!a-z]` / `[^a-z]` match one character from a class
//! - `\` makes the next character literal
//!
//! Matching is case-sensitive and anchored at both ends. A `[` without a
//! closing `]` is an ordinary character.

/// Whether `name` matches `pattern` in full.
pub fn matches(pattern: &str, name: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = name.chars().collect();

    let mut p = 0;
    let mut t = 0;
    // Resume point after the most recent `*`: (pattern index past the star, text index)
    let mut resume: Option<(usize, usize)> = None;

    while t < text.len() {
        let next = match pat.get(p) {
            Some('*') => {
                resume = Some((p + 1, t));
                p += 1;
                continue;
            }
            Some('?') => Some(p + 1),
            Some('[') => match match_class(&pat, p + 1, text[t]) {
                Some((true, after)) => Some(after),
                Some((false, _)) => None,
                None => (text[t] == '[').then_some(p + 1),
            },
            Some('\\') if p + 1 < pat.len() => (pat[p + 1] == text[t]).then_some(p + 2),
            Some(&c) => (c == text[t]).then_some(p + 1),
            None => None,
        };

        match next {
            Some(after) => {
                p = after;
                t += 1;
            }
            None => match resume {
                Some((star_p, star_t)) => {
                    p = star_p;
                    t = star_t + 1;
                    resume = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    pat[p..].iter().all(|&c| c == '*')
}

/// Whether every `[` in `pattern` opens a terminated class.
pub fn is_well_formed(pattern: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let mut p = 0;
    while p < pat.len() {
        match pat[p] {
            '\\' => p += 2,
            '[' => match match_class(&pat, p + 1, '\0') {
                Some((_, after)) => p = after,
                None => return false,
            },
            _ => p += 1,
        }
    }
    true
}

/// Evaluate the class starting just past `[` against `c`.
///
/// Returns whether `c` is in the class and the index past the closing `]`,
/// or `None` when the class is unterminated.
fn match_class(pat: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start;
    let negated = matches!(pat.get(i), Some('!') | Some('^'));
    if negated {
        i += 1;
    }

    let mut found = false;
    let mut first = true;
    loop {
        let (lo, after_lo) = class_char(pat, i)?;
        if pat[i] == ']' && !first {
            return Some((found != negated, i + 1));
        }
        first = false;
        i = after_lo;

        let mut hi = lo;
        if pat.get(i) == Some(&'-') && pat.get(i + 1).is_some_and(|&n| n != ']') {
            let (range_hi, after_hi) = class_char(pat, i + 1)?;
            hi = range_hi;
            i = after_hi;
        }

        if lo <= c && c <= hi {
            found = true;
        }
    }
}

/// Read one (possibly escaped) character inside a class.
fn class_char(pat: &[char], i: usize) -> Option<(char, usize)> {
    match pat.get(i)? {
        '\\' => pat.get(i + 1).map(|&c| (c, i + 2)),
        &c => Some((c, i + 1)),
    }
}
