use std::fmt;
use std::str::FromStr;

/// Site locales. `Es` is the default and the one unprefixed paths resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Es,
    En,
    Ru,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "es" => Ok(Locale::Es),
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_prefixes_parse() {
        assert_eq!("es".parse(), Ok(Locale::Es));
        assert_eq!("en".parse(), Ok(Locale::En));
        assert_eq!("ru".parse(), Ok(Locale::Ru));
    }

    #[test]
    fn unknown_prefixes_are_not_locales() {
        assert!(Locale::from_str("de").is_err());
        assert!(Locale::from_str("ES").is_err());
        assert!(Locale::from_str("").is_err());
    }
}
