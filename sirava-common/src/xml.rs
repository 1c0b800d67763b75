//! Program guide XML writing and reading
//!
//! Document shape (element names are fixed by downstream guide consumers):
//!
//! ```text
//! <rss>
//!   <program televize="Širava">
//!     <porad datum="YYYY-MM-DD">
//!       <porad id="YYYYMMDDHHMMSS">
//!         <cas-od>HH.MM</cas-od>
//!         <cas-do>HH.MM</cas-do>
//!         <nazev>..</nazev>
//!         <kratkypopis></kratkypopis>
//!         <dlouhypopis></dlouhypopis>
//!         <vysilani>
//!           <sirokouhle>Ano</sirokouhle>
//!           <stereo>Ano</stereo>
//!         </vysilani>
//!       </porad>
//!     </porad>
//!   </program>
//! </rss>
//! ```

use crate::schedule::{ProgramEntry, ScheduleDay, ScheduleDocument};
use crate::transform::Conversion;
use crate::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;
use std::io::Write;

/// Declaration written ahead of the root element
pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

const INDENT: usize = 2;

/// Serialize a document to program guide XML
///
/// Output is deterministic: days and entries are written in insertion
/// order with two-space indentation and no trailing newline.
pub fn to_xml(doc: &ScheduleDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(XML_HEADER.as_bytes().to_vec(), b' ', INDENT);
    write_document(&mut writer, doc).map_err(|e| Error::Serialize(e.to_string()))?;
    Ok(writer.into_inner())
}

/// Render a single conversion as a fresh one-day document
pub fn render_conversion(conversion: Conversion) -> Result<Vec<u8>> {
    let doc = crate::schedule::merge_into_document(
        ScheduleDocument::new(),
        &conversion.date,
        conversion.entries,
    );
    to_xml(&doc)
}

fn write_document<W: Write>(w: &mut Writer<W>, doc: &ScheduleDocument) -> quick_xml::Result<()> {
    w.write_event(Event::Start(BytesStart::new("rss")))?;

    let mut program = BytesStart::new("program");
    program.push_attribute(("televize", xml_chars(&doc.channel).as_ref()));
    w.write_event(Event::Start(program))?;
    if doc.days.is_empty() {
        keep_inline(w)?;
    }
    for day in &doc.days {
        write_day(w, day)?;
    }
    w.write_event(Event::End(BytesEnd::new("program")))?;

    w.write_event(Event::End(BytesEnd::new("rss")))?;
    Ok(())
}

fn write_day<W: Write>(w: &mut Writer<W>, day: &ScheduleDay) -> quick_xml::Result<()> {
    let mut start = BytesStart::new("porad");
    start.push_attribute(("datum", xml_chars(&day.date).as_ref()));
    w.write_event(Event::Start(start))?;
    if day.entries.is_empty() {
        keep_inline(w)?;
    }
    for entry in &day.entries {
        write_entry(w, entry)?;
    }
    w.write_event(Event::End(BytesEnd::new("porad")))
}

fn write_entry<W: Write>(w: &mut Writer<W>, entry: &ProgramEntry) -> quick_xml::Result<()> {
    let mut start = BytesStart::new("porad");
    start.push_attribute(("id", xml_chars(&entry.id).as_ref()));
    w.write_event(Event::Start(start))?;

    text_element(w, "cas-od", &entry.time_from)?;
    text_element(w, "cas-do", &entry.time_to)?;
    text_element(w, "nazev", &entry.title)?;
    text_element(w, "kratkypopis", &entry.short_description)?;
    text_element(w, "dlouhypopis", &entry.long_description)?;

    w.write_event(Event::Start(BytesStart::new("vysilani")))?;
    text_element(w, "sirokouhle", &entry.wide_screen)?;
    text_element(w, "stereo", &entry.stereo)?;
    w.write_event(Event::End(BytesEnd::new("vysilani")))?;

    w.write_event(Event::End(BytesEnd::new("porad")))
}

fn text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> quick_xml::Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(&xml_chars(text))))?;
    w.write_event(Event::End(BytesEnd::new(name)))
}

/// Replace characters outside the XML 1.0 `Char` production with U+FFFD
///
/// These have no escaped form, so the written guide stays well-formed.
fn xml_chars(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
            .collect(),
    )
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

// An empty text event keeps the closing tag on the opening tag's line.
fn keep_inline<W: Write>(w: &mut Writer<W>) -> quick_xml::Result<()> {
    w.write_event(Event::Text(BytesText::new("")))
}

/// Read a program guide document back from XML
///
/// Accepts both `<x/>` and `<x></x>` for empty fields and ignores unknown
/// elements. Days repeated in the input are folded into one.
pub fn from_xml(bytes: &[u8]) -> Result<ScheduleDocument> {
    parse_document(bytes).map_err(|e| match e {
        ReadError::Xml(e) => Error::MalformedSchedule(e.to_string()),
        ReadError::Structure(msg) => Error::MalformedSchedule(msg),
    })
}

enum ReadError {
    Xml(quick_xml::Error),
    Structure(String),
}

impl From<quick_xml::Error> for ReadError {
    fn from(e: quick_xml::Error) -> Self {
        ReadError::Xml(e)
    }
}

#[derive(Default)]
struct DocumentBuilder {
    doc: ScheduleDocument,
    stack: Vec<String>,
    day: Option<ScheduleDay>,
    entry: Option<ProgramEntry>,
    seen_root: bool,
}

impl DocumentBuilder {
    fn open(&mut self, e: &BytesStart) -> std::result::Result<(), ReadError> {
        let name = element_name(e)?;
        let depth = self.stack.len() + 1;

        match (depth, name.as_str()) {
            (1, "rss") => self.seen_root = true,
            (1, other) => {
                return Err(ReadError::Structure(format!(
                    "expected <rss> root element, found <{}>",
                    other
                )))
            }
            (2, "program") => {
                if let Some(channel) = attribute(e, "televize")? {
                    self.doc.channel = channel;
                }
            }
            (3, "porad") if self.in_path(&["rss", "program"]) => {
                self.day = Some(ScheduleDay {
                    date: attribute(e, "datum")?.unwrap_or_default(),
                    entries: Vec::new(),
                });
            }
            (4, "porad") if self.day.is_some() => {
                self.entry = Some(ProgramEntry {
                    id: attribute(e, "id")?.unwrap_or_default(),
                    ..Default::default()
                });
            }
            _ => {}
        }

        self.stack.push(name);
        Ok(())
    }

    fn close(&mut self) {
        let depth = self.stack.len();
        let name = self.stack.pop().unwrap_or_default();
        if name != "porad" {
            return;
        }

        match depth {
            4 => {
                if let (Some(entry), Some(day)) = (self.entry.take(), self.day.as_mut()) {
                    day.entries.push(entry);
                }
            }
            3 => {
                if let Some(day) = self.day.take() {
                    self.doc.merge(&day.date, day.entries);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        let field = match (self.stack.len(), self.stack.last().map(String::as_str)) {
            (5, Some("cas-od")) => &mut entry.time_from,
            (5, Some("cas-do")) => &mut entry.time_to,
            (5, Some("nazev")) => &mut entry.title,
            (5, Some("kratkypopis")) => &mut entry.short_description,
            (5, Some("dlouhypopis")) => &mut entry.long_description,
            (6, Some("sirokouhle")) if self.stack[4] == "vysilani" => &mut entry.wide_screen,
            (6, Some("stereo")) if self.stack[4] == "vysilani" => &mut entry.stereo,
            _ => return,
        };
        field.push_str(text);
    }

    fn in_path(&self, path: &[&str]) -> bool {
        self.stack.len() == path.len() && self.stack.iter().zip(path).all(|(a, b)| a == b)
    }

    fn finish(self) -> std::result::Result<ScheduleDocument, ReadError> {
        if !self.seen_root {
            return Err(ReadError::Structure("missing <rss> root element".to_string()));
        }
        if !self.stack.is_empty() {
            return Err(ReadError::Structure(format!(
                "unexpected end of document inside <{}>",
                self.stack.join("/")
            )));
        }
        Ok(self.doc)
    }
}

fn parse_document(bytes: &[u8]) -> std::result::Result<ScheduleDocument, ReadError> {
    // Field text is kept verbatim; indentation outside leaf fields is
    // dropped by the builder.
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(false);

    let mut builder = DocumentBuilder::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => builder.open(e)?,
            Event::Empty(ref e) => {
                builder.open(e)?;
                builder.close();
            }
            Event::End(_) => builder.close(),
            Event::Text(ref e) => builder.text(&e.unescape()?),
            Event::CData(e) => builder.text(&String::from_utf8_lossy(&e.into_inner())),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    builder.finish()
}

fn element_name(e: &BytesStart) -> std::result::Result<String, ReadError> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(|err| ReadError::Structure(format!("element name is not UTF-8: {}", err)))
}

fn attribute(e: &BytesStart, name: &str) -> std::result::Result<Option<String>, ReadError> {
    match e.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{merge_into_document, STATION_NAME};

    fn sample_document() -> ScheduleDocument {
        merge_into_document(
            ScheduleDocument::new(),
            "2024-06-01",
            vec![ProgramEntry::new("20240601060500", "06.05", "06.30", "Spravy Rano")],
        )
    }

    const SAMPLE_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<rss>
  <program televize=\"Širava\">
    <porad datum=\"2024-06-01\">
      <porad id=\"20240601060500\">
        <cas-od>06.05</cas-od>
        <cas-do>06.30</cas-do>
        <nazev>Spravy Rano</nazev>
        <kratkypopis></kratkypopis>
        <dlouhypopis></dlouhypopis>
        <vysilani>
          <sirokouhle>Ano</sirokouhle>
          <stereo>Ano</stereo>
        </vysilani>
      </porad>
    </porad>
  </program>
</rss>";

    #[test]
    fn test_to_xml_exact_layout() {
        let xml = to_xml(&sample_document()).unwrap();
        assert_eq!(String::from_utf8(xml).unwrap(), SAMPLE_XML);
    }

    #[test]
    fn test_to_xml_is_deterministic() {
        let doc = sample_document();
        assert_eq!(to_xml(&doc).unwrap(), to_xml(&doc).unwrap());
    }

    #[test]
    fn test_to_xml_escapes_text_and_attributes() {
        let doc = merge_into_document(
            ScheduleDocument::new(),
            "2024-06-01",
            vec![ProgramEntry::new("1&2", "", "", "Tom & Jerry <3>")],
        );
        let xml = String::from_utf8(to_xml(&doc).unwrap()).unwrap();
        assert!(xml.contains("<porad id=\"1&amp;2\">"));
        assert!(xml.contains("<nazev>Tom &amp; Jerry &lt;3&gt;</nazev>"));
        assert!(xml.contains("<cas-od></cas-od>"));
    }

    #[test]
    fn test_empty_day_closes_inline() {
        let doc = merge_into_document(ScheduleDocument::new(), "2024-06-01", Vec::new());
        let xml = String::from_utf8(to_xml(&doc).unwrap()).unwrap();
        assert!(xml.contains("<porad datum=\"2024-06-01\"></porad>"));
    }

    #[test]
    fn test_round_trip_recovers_document() {
        let doc = merge_into_document(
            sample_document(),
            "2024-06-02",
            vec![
                ProgramEntry::new("20240602080000", "08.00", "", "Ranne & spravy"),
                ProgramEntry::new("20240602000000", "", "", "Bez casu"),
            ],
        );

        let back = from_xml(&to_xml(&doc).unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_round_trip_keeps_surrounding_whitespace() {
        let conversion = crate::transform::convert_rundown(
            br#"{"ScheduledTime":"2024-06-01T06:00:00","SubEvents":[
                {"ScheduledTime":"2024-06-01T06:05:00","EventName":"Spravy_"},
                {"ScheduledTime":"2024-06-01T07:00:00","EventName":"_Pocasie"}
            ]}"#,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();
        let doc = merge_into_document(ScheduleDocument::new(), &conversion.date, conversion.entries);
        assert_eq!(doc.days[0].entries[0].title, "Spravy ");
        assert_eq!(doc.days[0].entries[1].title, " Pocasie");

        let back = from_xml(&to_xml(&doc).unwrap()).unwrap();
        assert_eq!(back, doc);

        // A second store/load cycle must not drift either
        let again = from_xml(&to_xml(&back).unwrap()).unwrap();
        assert_eq!(again, doc);
    }

    #[test]
    fn test_to_xml_replaces_forbidden_characters() {
        let doc = merge_into_document(
            ScheduleDocument::new(),
            "2024-06-01",
            vec![ProgramEntry::new("id\u{1}", "", "", "A\u{1}B\u{FFFE}C\tD")],
        );
        let xml = String::from_utf8(to_xml(&doc).unwrap()).unwrap();

        assert!(!xml.contains('\u{1}'));
        assert!(!xml.contains('\u{FFFE}'));
        assert!(xml.contains("<nazev>A\u{FFFD}B\u{FFFD}C\tD</nazev>"));
        assert!(xml.contains("<porad id=\"id\u{FFFD}\">"));
    }

    #[test]
    fn test_xml_chars_borrows_clean_text() {
        assert!(matches!(xml_chars("Spravy Rano"), Cow::Borrowed(_)));
        assert_eq!(xml_chars("a\u{0}b\u{1F}c"), "a\u{FFFD}b\u{FFFD}c");
        assert_eq!(xml_chars("Širava \u{1F4FA}"), "Širava \u{1F4FA}");
    }

    #[test]
    fn test_from_xml_accepts_self_closing_fields() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss><program televize="Širava"><porad datum="2024-06-01"><porad id="1">
<cas-od>06.00</cas-od><cas-do/><nazev>A</nazev><kratkypopis/><dlouhypopis/>
<vysilani><sirokouhle>Ano</sirokouhle><stereo>Ano</stereo></vysilani>
</porad></porad></program></rss>"#;

        let doc = from_xml(xml.as_bytes()).unwrap();
        assert_eq!(doc.channel, STATION_NAME);
        assert_eq!(doc.days[0].entries, vec![ProgramEntry::new("1", "06.00", "", "A")]);
    }

    #[test]
    fn test_from_xml_folds_repeated_days() {
        let xml = r#"<rss><program televize="X">
<porad datum="2024-06-01"><porad id="1"><nazev>A</nazev></porad></porad>
<porad datum="2024-06-01"><porad id="2"><nazev>B</nazev></porad></porad>
</program></rss>"#;

        let doc = from_xml(xml.as_bytes()).unwrap();
        assert_eq!(doc.channel, "X");
        assert_eq!(doc.days.len(), 1);
        assert_eq!(doc.days[0].entries.len(), 2);
    }

    #[test]
    fn test_from_xml_ignores_unknown_elements() {
        let xml = r#"<rss><meta>x</meta><program televize="Širava">
<porad datum="2024-06-01"><porad id="1"><nazev>A</nazev><zaner>film</zaner></porad></porad>
</program></rss>"#;

        let doc = from_xml(xml.as_bytes()).unwrap();
        assert_eq!(doc.days[0].entries[0].title, "A");
    }

    #[test]
    fn test_from_xml_rejects_wrong_root() {
        let err = from_xml(b"<feed></feed>").unwrap_err();
        assert!(matches!(err, Error::MalformedSchedule(_)));
    }

    #[test]
    fn test_from_xml_rejects_empty_input() {
        assert!(matches!(from_xml(b"").unwrap_err(), Error::MalformedSchedule(_)));
    }

    #[test]
    fn test_from_xml_rejects_truncated_document() {
        let xml = &SAMPLE_XML.as_bytes()[..SAMPLE_XML.len() / 2];
        assert!(matches!(from_xml(xml).unwrap_err(), Error::MalformedSchedule(_)));
    }

    #[test]
    fn test_from_xml_rejects_mismatched_tags() {
        let err = from_xml(b"<rss><program></rss>").unwrap_err();
        assert!(matches!(err, Error::MalformedSchedule(_)));
    }

    #[test]
    fn test_render_conversion() {
        let conversion = Conversion {
            date: "2024-06-01".to_string(),
            entries: vec![ProgramEntry::new("20240601060500", "06.05", "06.30", "Spravy Rano")],
        };
        let xml = render_conversion(conversion).unwrap();
        assert_eq!(String::from_utf8(xml).unwrap(), SAMPLE_XML);
    }
}
