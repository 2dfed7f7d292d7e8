//! HTML listing rendered with askama (`templates/index.html`).

use crate::domain::model::HospitalCard;
use crate::utils::error::Result;
use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub cards: &'a [HospitalCard],
    pub blocked: &'a [String],
    pub exclude_blocked: bool,
}

pub fn render_index(cards: &[HospitalCard], blocked: &[String], exclude_blocked: bool) -> Result<String> {
    let page = IndexTemplate {
        cards,
        blocked,
        exclude_blocked,
    };
    Ok(page.render()?)
}
