use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Normal,
    Single,
    Double,
}

/// 以 POSIX shell 的規則切割參數字串：
/// 空白分隔，支援單引號、雙引號與反斜線跳脫。
/// 引號不成對時回傳錯誤，由呼叫端決定如何降級
pub fn split_shell_words(input: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut state = QuoteState::Normal;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match state {
            QuoteState::Normal => match c {
                '\'' => {
                    state = QuoteState::Single;
                    in_word = true;
                }
                '"' => {
                    state = QuoteState::Double;
                    in_word = true;
                }
                '\\' => match chars.next() {
                    Some(escaped) => {
                        current.push(escaped);
                        in_word = true;
                    }
                    None => bail!("結尾的反斜線缺少跳脫對象"),
                },
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
            QuoteState::Single => match c {
                '\'' => state = QuoteState::Normal,
                c => current.push(c),
            },
            QuoteState::Double => match c {
                '"' => state = QuoteState::Normal,
                '\\' => match chars.next() {
                    // 雙引號內只有這幾個字元需要跳脫，其餘保留反斜線
                    Some(escaped @ ('"' | '\\' | '$' | '`')) => current.push(escaped),
                    Some(other) => {
                        current.push('\\');
                        current.push(other);
                    }
                    None => bail!("雙引號內結尾的反斜線缺少跳脫對象"),
                },
                c => current.push(c),
            },
        }
    }

    if state != QuoteState::Normal {
        bail!("引號不成對: {input}");
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}
