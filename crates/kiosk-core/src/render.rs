//! Dashboard rendering.
//!
//! The static template is parsed with `scraper`, the timetable and quote containers
//! are emptied, and freshly rendered `minijinja` fragments take their place. The
//! fragment templates end in `.html`, so every interpolated value is HTML-escaped.

use minijinja::{context, Environment};
use scraper::node::Comment;
use scraper::{Html, Node};
use serde::Serialize;

use crate::departure::{DepartureRecord, StopBoard};
use crate::error::RenderError;
use crate::quote::Quote;
use crate::time_format::{seconds_to_clock, LocalClock};
use crate::urgency::UrgencyTier;

pub const TIMETABLE_CONTAINER_ID: &str = "timetable-container";
pub const QUOTE_CONTAINER_ID: &str = "quote-container";

const TIMETABLE_TEMPLATE: &str = r#"
{%- if station %}<h2 class="station-name">Timetables for {{ station }}</h2>{% endif -%}
{%- for d in departures -%}
<div class="departure urgency-{{ d.tier }}">
  <img class="metro-icon" src="/images/metro-{{ d.tier }}.svg" alt="">
  {%- if d.route %}<span class="route">{{ d.route }}</span>{% endif %}
  <span class="departure-time">{{ d.clock }}</span>
  <span class="minutes-until">{{ d.minutes }} min</span>
  {%- for a in d.arrivals %}
  <span class="arrival">{{ a.label }} {{ a.clock }}</span>
  {%- endfor %}
</div>
{%- else -%}
<p class="no-data">No data found.</p>
{%- endfor -%}
"#;

const QUOTE_TEMPLATE: &str = r#"<blockquote class="quote"><p class="quote-text">{{ quote.text }}</p><footer class="quote-author">{{ quote.author }}</footer></blockquote>"#;

#[derive(Serialize)]
struct DepartureView {
    clock: String,
    minutes: i64,
    tier: UrgencyTier,
    route: Option<String>,
    arrivals: Vec<ArrivalView>,
}

#[derive(Serialize)]
struct ArrivalView {
    label: String,
    clock: String,
}

impl DepartureView {
    fn new(record: &DepartureRecord, now: LocalClock) -> Self {
        Self {
            clock: record.clock(),
            minutes: record.minutes_until(now),
            tier: record.urgency(now),
            route: record.route_short_name.clone(),
            arrivals: record
                .downstream
                .iter()
                .map(|a| ArrivalView {
                    label: a.label.clone(),
                    clock: seconds_to_clock(a.arrival),
                })
                .collect(),
        }
    }
}

pub struct DashboardRenderer {
    env: Environment<'static>,
}

impl DashboardRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_template("timetable.html", TIMETABLE_TEMPLATE)?;
        env.add_template("quote.html", QUOTE_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Fills the template's timetable and quote containers.
    ///
    /// Existing container content is dropped first, so rendering the output again
    /// gives the same document rather than piling up blocks.
    pub fn render(
        &self,
        template: &str,
        board: &StopBoard,
        quote: &Quote,
        now: LocalClock,
    ) -> Result<String, RenderError> {
        let timetable = self.timetable_markup(board, now)?;
        let quote = self.quote_markup(quote)?;

        let mut document = Html::parse_document(template);
        let timetable_marker = clear_and_mark(&mut document, TIMETABLE_CONTAINER_ID)?;
        let quote_marker = clear_and_mark(&mut document, QUOTE_CONTAINER_ID)?;

        Ok(document
            .html()
            .replacen(&timetable_marker, &timetable, 1)
            .replacen(&quote_marker, &quote, 1))
    }

    fn timetable_markup(&self, board: &StopBoard, now: LocalClock) -> Result<String, RenderError> {
        let departures: Vec<DepartureView> = board
            .departures
            .iter()
            .map(|d| DepartureView::new(d, now))
            .collect();
        let tmpl = self.env.get_template("timetable.html")?;
        Ok(tmpl.render(context! {
            station => board.station_name,
            departures => departures,
        })?)
    }

    fn quote_markup(&self, quote: &Quote) -> Result<String, RenderError> {
        let tmpl = self.env.get_template("quote.html")?;
        Ok(tmpl.render(context! { quote => quote })?)
    }
}

/// Empties the element with `container_id` and leaves a comment marker in it.
/// Returns the marker as it appears in serialized output.
fn clear_and_mark(document: &mut Html, container_id: &str) -> Result<String, RenderError> {
    let missing = || RenderError::MissingContainer(container_id.to_string());

    let node_id = document
        .root_element()
        .descendants()
        .find(|node| matches!(node.value(), Node::Element(el) if el.id() == Some(container_id)))
        .map(|node| node.id())
        .ok_or_else(missing)?;

    let mut container = document.tree.get_mut(node_id).ok_or_else(missing)?;
    while let Some(mut child) = container.first_child() {
        child.detach();
    }

    let marker = format!("kiosk:{}", container_id);
    container.append(Node::Comment(Comment {
        comment: marker.as_str().into(),
    }));
    Ok(format!("<!--{}-->", marker))
}
