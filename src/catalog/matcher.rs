use super::normalize;

// A search query, normalized once and then tested against any number of fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Matcher {
    // The normalized query.
    query: String,
}

impl Matcher {
    pub fn new(query: &str) -> Self {
        Self {
            query: normalize(query),
        }
    }

    // Whether the query places no constraint on the fields.
    pub fn is_blank(&self) -> bool {
        self.query.is_empty()
    }

    // A field matches when it contains the whole query, or failing that,
    // when it contains every space-separated word of the query.
    pub fn is_match(&self, field: &str) -> bool {
        if self.is_blank() {
            return true;
        }

        let field = normalize(field);

        field.contains(&self.query) || self.query.split(' ').all(|word| field.contains(word))
    }

    // Whether any one of the fields matches on its own.
    pub fn is_match_any<'a, I>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.is_blank() {
            return true;
        }

        fields.into_iter().any(|field| self.is_match(field))
    }
}

pub fn matches(query: &str, field: &str) -> bool {
    Matcher::new(query).is_match(field)
}

pub fn matches_any<'a, I>(query: &str, fields: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    Matcher::new(query).is_match_any(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_always_matches() {
        for query in ["", "   ", "\t\n"] {
            assert!(matches(query, "Ave Maria"));
            assert!(matches(query, ""));
            assert!(matches_any(query, []));
        }
    }

    #[test]
    fn test_substring_match() {
        assert!(matches("maria", "Ave Maria"));
        assert!(matches("ave ma", "Ave Maria"));
        assert!(!matches("marie", "Ave Maria"));
    }

    #[test]
    fn test_words_match_in_any_order() {
        assert!(matches("jan kowal", "Kowalski Jan"));
        assert!(
            !matches("kowal jankow", "Jan Kowalski"),
            "every word must be a substring of the field"
        );
    }

    #[test]
    fn test_ignores_diacritics_and_case() {
        assert!(matches("ZOLC", "zażółć"));
        assert!(matches("łąka", "LAKA"));
        assert!(matches("gorecki", "Henryk Mikołaj Górecki"));
    }

    #[test]
    fn test_words_must_be_in_a_single_field() {
        let fields = ["Jan Kowalski", "Ave Maria"];

        assert!(matches_any("kowalski", fields));
        assert!(matches_any("maria ave", fields));
        assert!(
            !matches_any("kowalski maria", fields),
            "words split across two fields should not match"
        );
    }
}
