//! Amazon storefront locales: request language, currency symbol and number format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Amazon storefronts the price parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Us,
    Uk,
    De,
    Fr,
    Es,
    It,
    Ca,
    Au,
    Jp,
    In,
    Br,
    Mx,
    Nl,
    Se,
    Pl,
}

const ALL: [Region; 15] = [
    Region::Us,
    Region::Uk,
    Region::De,
    Region::Fr,
    Region::Es,
    Region::It,
    Region::Ca,
    Region::Au,
    Region::Jp,
    Region::In,
    Region::Br,
    Region::Mx,
    Region::Nl,
    Region::Se,
    Region::Pl,
];

impl Region {
    /// Returns the Amazon domain for this region.
    pub fn domain(&self) -> &'static str {
        match self {
            Region::Us => "amazon.com",
            Region::Uk => "amazon.co.uk",
            Region::De => "amazon.de",
            Region::Fr => "amazon.fr",
            Region::Es => "amazon.es",
            Region::It => "amazon.it",
            Region::Ca => "amazon.ca",
            Region::Au => "amazon.com.au",
            Region::Jp => "amazon.co.jp",
            Region::In => "amazon.in",
            Region::Br => "amazon.com.br",
            Region::Mx => "amazon.com.mx",
            Region::Nl => "amazon.nl",
            Region::Se => "amazon.se",
            Region::Pl => "amazon.pl",
        }
    }

    /// Symbol used when printing prices in alerts.
    pub fn currency_symbol(&self) -> &'static str {
        match self {
            Region::Us | Region::Ca | Region::Au | Region::Mx => "$",
            Region::Uk => "£",
            Region::De | Region::Fr | Region::Es | Region::It | Region::Nl => "€",
            Region::Jp => "¥",
            Region::In => "₹",
            Region::Br => "R$",
            Region::Se => "kr ",
            Region::Pl => "zł ",
        }
    }

    /// Returns the Accept-Language header value for this region.
    pub fn accept_language(&self) -> &'static str {
        match self {
            Region::Us | Region::Ca | Region::Au => "en-US,en;q=0.9",
            Region::Uk => "en-GB,en;q=0.9",
            Region::De => "de-DE,de;q=0.9,en;q=0.8",
            Region::Fr => "fr-FR,fr;q=0.9,en;q=0.8",
            Region::Es | Region::Mx => "es-ES,es;q=0.9,en;q=0.8",
            Region::It => "it-IT,it;q=0.9,en;q=0.8",
            Region::Jp => "ja-JP,ja;q=0.9,en;q=0.8",
            Region::In => "en-IN,en;q=0.9",
            Region::Br => "pt-BR,pt;q=0.9,en;q=0.8",
            Region::Nl => "nl-NL,nl;q=0.9,en;q=0.8",
            Region::Se => "sv-SE,sv;q=0.9,en;q=0.8",
            Region::Pl => "pl-PL,pl;q=0.9,en;q=0.8",
        }
    }

    /// Returns whether this region uses comma as decimal separator.
    pub fn uses_comma_decimal(&self) -> bool {
        matches!(
            self,
            Region::De
                | Region::Fr
                | Region::Es
                | Region::It
                | Region::Nl
                | Region::Se
                | Region::Pl
                | Region::Br
        )
    }

    /// Infers the storefront from a product URL's host.
    ///
    /// Returns `None` for hosts that are not an Amazon storefront, such as
    /// `amzn.to` short links or a local test server.
    pub fn from_url(url: &str) -> Option<Region> {
        let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
        let host = rest.split(['/', '?', '#']).next()?;
        let host = host.rsplit_once('@').map_or(host, |(_, h)| h);
        let host = host.split(':').next()?.to_ascii_lowercase();

        ALL.into_iter().find(|region| {
            let domain = region.domain();
            host == domain || host.strip_suffix(domain).is_some_and(|sub| sub.ends_with('.'))
        })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Region::Us => "us",
            Region::Uk => "uk",
            Region::De => "de",
            Region::Fr => "fr",
            Region::Es => "es",
            Region::It => "it",
            Region::Ca => "ca",
            Region::Au => "au",
            Region::Jp => "jp",
            Region::In => "in",
            Region::Br => "br",
            Region::Mx => "mx",
            Region::Nl => "nl",
            Region::Se => "se",
            Region::Pl => "pl",
        };
        write!(f, "{}", code)
    }
}

impl FromStr for Region {
    type Err = RegionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "us" | "usa" => Ok(Region::Us),
            "uk" | "gb" => Ok(Region::Uk),
            "de" => Ok(Region::De),
            "fr" => Ok(Region::Fr),
            "es" => Ok(Region::Es),
            "it" => Ok(Region::It),
            "ca" => Ok(Region::Ca),
            "au" => Ok(Region::Au),
            "jp" => Ok(Region::Jp),
            "in" | "india" => Ok(Region::In),
            "br" => Ok(Region::Br),
            "mx" => Ok(Region::Mx),
            "nl" => Ok(Region::Nl),
            "se" => Ok(Region::Se),
            "pl" => Ok(Region::Pl),
            _ => Err(RegionParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegionParseError(String);

impl fmt::Display for RegionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<String> = ALL.iter().map(Region::to_string).collect();
        write!(f, "Unknown region '{}'. Valid regions: {}", self.0, codes.join(", "))
    }
}

impl std::error::Error for RegionParseError {}
