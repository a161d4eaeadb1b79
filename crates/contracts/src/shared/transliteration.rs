//! Транслитерация кириллицы в латиницу для артикулов

/// Латинский фрагмент для строчной кириллической буквы
fn latin_for(lower: char) -> Option<&'static str> {
    let fragment = match lower {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(fragment)
}

/// Транслитерировать текст посимвольно с сохранением регистра.
/// Символы вне таблицы остаются без изменений.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let lower = ch.to_lowercase().next().unwrap_or(ch);
        match latin_for(lower) {
            Some(fragment) if ch.is_uppercase() => out.push_str(&fragment.to_uppercase()),
            Some(fragment) => out.push_str(fragment),
            None => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_table() {
        assert_eq!(transliterate("щука"), "schuka");
        assert_eq!(transliterate("объявление"), "obyavlenie");
        assert_eq!(transliterate("ёжик"), "ezhik");
    }

    #[test]
    fn test_case_is_preserved_per_character() {
        assert_eq!(transliterate("Шапка"), "SHapka");
        assert_eq!(transliterate("ЧЕРНЫЙ"), "CHERNYY");
        assert_eq!(transliterate("ЪЬ"), "");
    }

    #[test]
    fn test_unmapped_characters_pass_through() {
        assert_eq!(transliterate("TSH-NK-L"), "TSH-NK-L");
        assert_eq!(transliterate("хлопок 100%"), "hlopok 100%");
        assert_eq!(transliterate(""), "");
    }
}
