use scraper::{Html, Selector};

/// The values of the radio buttons in `html`, in document order.
pub(crate) fn radio_values(html: &Html) -> Vec<String> {
    html.select(&Selector::parse("input[type=radio]").unwrap())
        .map(|input| input.value().attr("value").unwrap_or_default().to_owned())
        .collect()
}

/// The value of the first checked radio button in `html`.
pub(crate) fn checked_radio_value(html: &Html) -> Option<String> {
    html.select(&Selector::parse("input[type=radio][checked]").unwrap())
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_owned)
}
