//! Document assembly: layout rules and a minimal WordprocessingML writer

use std::fs::{self, File};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use log::{debug, info, error};
use quick_xml::escape::escape;
use std::borrow::Cow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const DOCX_EXTENSION: &str = "docx";
pub const DOCX_CONTENT_TYPE: &str
  = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const TWIPS_PER_INCH: f64 = 1440.0;
const LETTER_WIDTH_TWIPS: u32 = 12240;
const LETTER_HEIGHT_TWIPS: u32 = 15840;
const HEADER_FOOTER_DISTANCE_TWIPS: u32 = 720;

const W_NS: &str
  = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str
  = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

// ===== Layout Types =====

/// Horizontal paragraph alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment
{   #[default]
    Left
  , Center
  , Right
}

impl Alignment
{   /// Side a colliding footer is moved to; `center` moves left
    pub fn opposite(self) -> Self
    {   match self
        {   Alignment::Left => Alignment::Right
          , Alignment::Right => Alignment::Left
          , Alignment::Center => Alignment::Left
        }
    }

    fn as_ooxml(self) -> &'static str
    {   match self
        {   Alignment::Left => "left"
          , Alignment::Center => "center"
          , Alignment::Right => "right"
        }
    }
}

/// Page margins in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins
{   pub top: f64
  , pub bottom: f64
  , pub left: f64
  , pub right: f64
}

impl Default for Margins
{   fn default() -> Self
    {   Margins { top: 1.0, bottom: 1.0, left: 1.0, right: 1.0 }
    }
}

impl Margins
{   fn validate(&self) -> Result<(), crate::error::Error>
    {   for (name, value) in [
          ("top", self.top)
        , ("bottom", self.bottom)
        , ("left", self.left)
        , ("right", self.right)
        ]
        {   if !value.is_finite() || value < 0.0
            {   return Err(crate::error::Error::validation(
                  format!("Invalid '{}' margin: {}", name, value)
                ));
            }
        }
        Ok(())
    }
}

fn inches_to_twips(inches: f64) -> u32
{   (inches * TWIPS_PER_INCH).round() as u32
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSpec
{   pub text: String
  , pub alignment: Alignment
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterSpec
{   pub text: String
  , pub alignment: Alignment
  , /// Append a PAGE field after the text
    pub page_number: bool
}

impl FooterSpec
{   fn is_empty(&self) -> bool
    {   self.text.trim().is_empty() && !self.page_number
    }
}

fn enabled_by_default() -> bool
{   true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverPage
{   #[serde(default = "enabled_by_default")]
    pub enabled: bool
  , #[serde(default)]
    pub title: String
  , #[serde(default)]
    pub submitted_to: String
  , #[serde(default)]
    pub submitted_by: String
}

/// Everything needed to lay out one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSpec
{   #[serde(rename = "text")]
    pub body_text: String
  , pub margins: Margins
  , pub header: Option<HeaderSpec>
  , pub footer1: Option<FooterSpec>
  , pub footer2: Option<FooterSpec>
  , pub cover_page: Option<CoverPage>
}

/// Move the footer without a page number away from the one that has it
/// when both ask for the same side
pub fn resolve_footer_collision(
  footer1: &mut FooterSpec
, footer2: &mut FooterSpec
)
{   if footer1.alignment != footer2.alignment
      || footer1.page_number == footer2.page_number
    {   return;
    }
    let other = if footer2.page_number { footer1 } else { footer2 };
    let flipped = other.alignment.opposite();
    debug!(
      "Footer alignment collision on {:?}, moving footer to {:?}",
      other.alignment, flipped
    );
    other.alignment = flipped;
}

impl DocumentSpec
{   pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.body_text.trim().is_empty()
        {   return Err(crate::error::Error::validation("Missing 'text'"));
        }
        self.margins.validate()
    }

    /// Footers with the collision rule applied, empty ones dropped
    pub fn resolved_footers(&self) -> Vec<FooterSpec>
    {   let mut footer1 = self.footer1.clone().unwrap_or_default();
        let mut footer2 = self.footer2.clone().unwrap_or_default();
        if !footer1.is_empty() && !footer2.is_empty()
        {   resolve_footer_collision(&mut footer1, &mut footer2);
        }
        [footer1, footer2]
          .into_iter()
          .filter(|f| !f.is_empty())
          .collect()
    }

    fn header(&self) -> Option<&HeaderSpec>
    {   self.header.as_ref().filter(|h| !h.text.trim().is_empty())
    }

    fn cover(&self) -> Option<&CoverPage>
    {   self.cover_page.as_ref().filter(|c| c.enabled)
    }
}

// ===== WordprocessingML =====

/// Drop characters XML 1.0 cannot carry: C0 controls other than tab and
/// line breaks, and the U+FFFE/U+FFFF noncharacters.
fn xml_chars(text: &str) -> Cow<'_, str>
{   fn allowed(c: char) -> bool
    {   !matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}'
          | '\u{fffe}' | '\u{ffff}')
    }
    if text.chars().all(allowed)
    {   Cow::Borrowed(text)
    } else
    {   Cow::Owned(text.chars().filter(|c| allowed(*c)).collect())
    }
}

fn run(text: &str, bold: bool, half_points: Option<u32>) -> String
{   let mut props = String::new();
    if bold
    {   props.push_str("<w:b/>");
    }
    if let Some(size) = half_points
    {   props.push_str(&format!("<w:sz w:val=\"{}\"/>", size));
    }
    let props = if props.is_empty()
    {   String::new()
    } else
    {   format!("<w:rPr>{}</w:rPr>", props)
    };
    format!(
      "<w:r>{}<w:t xml:space=\"preserve\">{}</w:t></w:r>",
      props,
      escape(&*xml_chars(text))
    )
}

fn paragraph(alignment: Option<Alignment>, runs: &str) -> String
{   let props = alignment
      .map(|a| format!("<w:pPr><w:jc w:val=\"{}\"/></w:pPr>", a.as_ooxml()))
      .unwrap_or_default();
    format!("<w:p>{}{}</w:p>", props, runs)
}

fn page_field() -> &'static str
{   concat!(
      "<w:r><w:fldChar w:fldCharType=\"begin\"/></w:r>",
      "<w:r><w:instrText xml:space=\"preserve\"> PAGE </w:instrText></w:r>",
      "<w:r><w:fldChar w:fldCharType=\"separate\"/></w:r>",
      "<w:r><w:t>1</w:t></w:r>",
      "<w:r><w:fldChar w:fldCharType=\"end\"/></w:r>"
    )
}

fn cover_xml(cover: &CoverPage) -> String
{   let mut xml = String::new();
    xml.push_str(&paragraph(
      Some(Alignment::Center),
      &run(&cover.title, true, Some(48))
    ));
    for (label, value) in [
      ("Submitted to: ", &cover.submitted_to)
    , ("Submitted by: ", &cover.submitted_by)
    ]
    {   if value.trim().is_empty()
        {   continue;
        }
        let runs = format!("{}{}", run(label, true, None), run(value, false, None));
        xml.push_str(&paragraph(Some(Alignment::Center), &runs));
    }
    xml.push_str("<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>");
    xml
}

fn section_xml(spec: &DocumentSpec, has_header: bool, has_footer: bool) -> String
{   let mut xml = String::from("<w:sectPr>");
    if has_header
    {   xml.push_str("<w:headerReference w:type=\"default\" r:id=\"rIdHeader1\"/>");
    }
    if has_footer
    {   xml.push_str("<w:footerReference w:type=\"default\" r:id=\"rIdFooter1\"/>");
    }
    let m = &spec.margins;
    xml.push_str(&format!(
      "<w:pgSz w:w=\"{}\" w:h=\"{}\"/>\
       <w:pgMar w:top=\"{}\" w:right=\"{}\" w:bottom=\"{}\" w:left=\"{}\" \
       w:header=\"{}\" w:footer=\"{}\" w:gutter=\"0\"/>",
      LETTER_WIDTH_TWIPS,
      LETTER_HEIGHT_TWIPS,
      inches_to_twips(m.top),
      inches_to_twips(m.right),
      inches_to_twips(m.bottom),
      inches_to_twips(m.left),
      HEADER_FOOTER_DISTANCE_TWIPS,
      HEADER_FOOTER_DISTANCE_TWIPS
    ));
    if spec.cover().is_some()
    {   // Cover is page 0 so the body starts numbering at 1.
        xml.push_str("<w:pgNumType w:start=\"0\"/><w:titlePg/>");
    }
    xml.push_str("</w:sectPr>");
    xml
}

/// `word/document.xml`
pub fn render_document_xml(spec: &DocumentSpec) -> String
{   let mut body = String::new();
    if let Some(cover) = spec.cover()
    {   body.push_str(&cover_xml(cover));
    }
    for line in spec.body_text.lines()
    {   if line.is_empty()
        {   body.push_str("<w:p/>");
        } else
        {   body.push_str(&paragraph(None, &run(line, false, None)));
        }
    }
    body.push_str(&section_xml(
      spec,
      spec.header().is_some(),
      !spec.resolved_footers().is_empty()
    ));
    format!(
      "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
       <w:document xmlns:w=\"{}\" xmlns:r=\"{}\"><w:body>{}</w:body></w:document>",
      W_NS, R_NS, body
    )
}

/// `word/header1.xml`
pub fn render_header_xml(header: &HeaderSpec) -> String
{   format!(
      "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
       <w:hdr xmlns:w=\"{}\" xmlns:r=\"{}\">{}</w:hdr>",
      W_NS,
      R_NS,
      paragraph(Some(header.alignment), &run(&header.text, false, None))
    )
}

/// `word/footer1.xml`, one paragraph per footer
pub fn render_footer_xml(footers: &[FooterSpec]) -> String
{   let paragraphs: String = footers
      .iter()
      .map(|footer| {
        let mut runs = String::new();
        if !footer.text.is_empty()
        {   runs.push_str(&run(&footer.text, false, None));
        }
        if footer.page_number
        {   if !footer.text.is_empty()
            {   runs.push_str(&run(" ", false, None));
            }
            runs.push_str(page_field());
        }
        paragraph(Some(footer.alignment), &runs)
      })
      .collect();
    format!(
      "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
       <w:ftr xmlns:w=\"{}\" xmlns:r=\"{}\">{}</w:ftr>",
      W_NS, R_NS, paragraphs
    )
}

fn content_types_xml(has_header: bool, has_footer: bool) -> String
{   let mut overrides = String::from(
      "<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>"
    );
    if has_header
    {   overrides.push_str(
          "<Override PartName=\"/word/header1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml\"/>"
        );
    }
    if has_footer
    {   overrides.push_str(
          "<Override PartName=\"/word/footer1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml\"/>"
        );
    }
    format!(
      "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
       <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
       <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
       <Default Extension=\"xml\" ContentType=\"application/xml\"/>{}</Types>",
      overrides
    )
}

const PACKAGE_RELS: &str = concat!(
  "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
  "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
  "<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>",
  "</Relationships>"
);

fn document_rels_xml(has_header: bool, has_footer: bool) -> String
{   let mut rels = String::new();
    if has_header
    {   rels.push_str(
          "<Relationship Id=\"rIdHeader1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/header\" Target=\"header1.xml\"/>"
        );
    }
    if has_footer
    {   rels.push_str(
          "<Relationship Id=\"rIdFooter1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer\" Target=\"footer1.xml\"/>"
        );
    }
    format!(
      "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
       <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{}</Relationships>",
      rels
    )
}

fn zip_err(e: zip::result::ZipError) -> crate::error::Error
{   crate::error::Error::Io(e.to_string())
}

/// Write the full `.docx` package for `spec` into `writer`
pub fn write_docx<W: Write + Seek>(
  spec: &DocumentSpec
, writer: W
) -> Result<W, crate::error::Error>
{   spec.validate()?;

    let header = spec.header();
    let footers = spec.resolved_footers();
    let has_footer = !footers.is_empty();

    let mut parts: Vec<(&str, String)> = vec![
      ("[Content_Types].xml", content_types_xml(header.is_some(), has_footer))
    , ("_rels/.rels", PACKAGE_RELS.to_string())
    , ("word/document.xml", render_document_xml(spec))
    , ("word/_rels/document.xml.rels", document_rels_xml(header.is_some(), has_footer))
    ];
    if let Some(header) = header
    {   parts.push(("word/header1.xml", render_header_xml(header)));
    }
    if has_footer
    {   parts.push(("word/footer1.xml", render_footer_xml(&footers)));
    }

    let options = FileOptions::default()
      .compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);
    for (name, xml) in parts
    {   zip.start_file(name, options).map_err(zip_err)?;
        zip.write_all(xml.as_bytes())?;
    }
    zip.finish().map_err(zip_err)
}

// ===== Storage =====

/// Handle to a document written by [`DocumentStore::prepare`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument
{   pub file_id: Uuid
  , pub path: PathBuf
}

/// Writes documents under fresh ids; never deletes them
#[derive(Debug, Clone)]
pub struct DocumentStore
{   output_dir: PathBuf
}

impl DocumentStore
{   pub fn new(output_dir: impl Into<PathBuf>) -> Self
    {   DocumentStore { output_dir: output_dir.into() }
    }

    pub fn output_dir(&self) -> &Path
    {   &self.output_dir
    }

    fn path_for(&self, file_id: &Uuid) -> PathBuf
    {   self.output_dir.join(format!("{}.{}", file_id, DOCX_EXTENSION))
    }

    /// Lay out `spec` and save it as `<uuid>.docx`
    pub fn prepare(&self, spec: &DocumentSpec)
      -> Result<PreparedDocument, crate::error::Error>
    {   spec.validate()?;
        fs::create_dir_all(&self.output_dir)?;

        let file_id = Uuid::new_v4();
        let path = self.path_for(&file_id);
        let partial = path.with_extension("docx.part");

        let written = File::create(&partial)
          .map_err(crate::error::Error::from)
          .and_then(|file| write_docx(spec, file))
          .and_then(|file| file.sync_all().map_err(crate::error::Error::from));
        if let Err(e) = written
        {   error!("Failed to write document {}: {}", file_id, e);
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        fs::rename(&partial, &path)?;

        info!("Prepared document {} at {}", file_id, path.display());
        Ok(PreparedDocument { file_id, path })
    }

    /// Locate a previously prepared document
    pub fn locate(&self, file_id: &str)
      -> Result<PathBuf, crate::error::Error>
    {   let id = Uuid::parse_str(file_id).map_err(|_| {
          crate::error::Error::validation("Invalid 'file_id'")
        })?;
        let path = self.path_for(&id);
        if path.is_file()
        {   Ok(path)
        } else
        {   Err(crate::error::Error::NotFound(format!("document {}", id)))
        }
    }
}
