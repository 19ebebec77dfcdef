use folio_render_core::RenderError;
use lopdf::content::Content;
use lopdf::xref::{Xref, XrefEntry, XrefType};
use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};
use std::collections::BTreeMap;
use std::io::{self, Seek, Write};

/// Writes PDF objects as soon as they are complete and keeps the cross
/// reference table in memory.
pub struct StreamingPdfWriter<W: Write + Seek> {
    writer: W,
    xref: Xref,
    max_id: u32,
    pub catalog_id: ObjectId,
    pub pages_id: ObjectId,
    pub resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    info: Option<Dictionary>,
    buffered_objects: BTreeMap<ObjectId, Object>,
}

impl<W: Write + Seek> StreamingPdfWriter<W> {
    pub fn new(mut writer: W, version: &str, font_dict: Dictionary) -> io::Result<Self> {
        writer.write_all(format!("%PDF-{version}\n%\u{e2}\u{e3}\u{cf}\u{d3}\n").as_bytes())?;

        let resources_id = (1, 0);
        let pages_id = (2, 0);
        let catalog_id = (3, 0);

        let mut buffered_objects = BTreeMap::new();
        buffered_objects.insert(resources_id, dictionary! { "Font" => font_dict }.into());

        Ok(Self {
            writer,
            xref: Xref::new(0, XrefType::CrossReferenceTable),
            max_id: 3,
            catalog_id,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            info: None,
            buffered_objects,
        })
    }

    pub fn new_object_id(&mut self) -> ObjectId {
        self.max_id += 1;
        (self.max_id, 0)
    }

    /// Writes `object` under a fresh id right away.
    pub fn write_object(&mut self, object: Object) -> io::Result<ObjectId> {
        let id = self.new_object_id();
        self.write_object_at_id(id, &object)?;
        Ok(id)
    }

    /// Writes `object` under an id handed out earlier by [`Self::new_object_id`].
    pub fn write_object_at_id(&mut self, id: ObjectId, object: &Object) -> io::Result<()> {
        if id.0 > self.max_id {
            self.max_id = id.0;
        }
        encode::write_indirect_object(&mut self.writer, id, object, &mut self.xref)
    }

    pub fn write_content_stream(&mut self, content: Content) -> Result<ObjectId, RenderError> {
        let stream = Stream::new(dictionary! {}, content.encode()?);
        Ok(self.write_object(Object::Stream(stream))?)
    }

    /// Keeps `object` until [`Self::finish`].
    pub fn buffer_object_at_id(&mut self, id: ObjectId, object: Object) {
        if id.0 > self.max_id {
            self.max_id = id.0;
        }
        self.buffered_objects.insert(id, object);
    }

    pub fn set_page_ids(&mut self, page_ids: Vec<ObjectId>) {
        self.page_ids = page_ids;
    }

    pub fn set_info(&mut self, info: Dictionary) {
        self.info = Some(info);
    }

    pub fn finish(mut self) -> io::Result<W> {
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => self.page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
            "Count" => self.page_ids.len() as i64,
        };
        self.buffer_object_at_id(self.pages_id, pages_dict.into());
        let catalog_dict = dictionary! { "Type" => "Catalog", "Pages" => self.pages_id };
        self.buffer_object_at_id(self.catalog_id, catalog_dict.into());
        let info_id = match self.info.take() {
            Some(info) => {
                let id = self.new_object_id();
                self.buffer_object_at_id(id, info.into());
                Some(id)
            }
            None => None,
        };

        let buffered = std::mem::take(&mut self.buffered_objects);
        for (id, object) in &buffered {
            encode::write_indirect_object(&mut self.writer, *id, object, &mut self.xref)?;
        }

        let xref_start = self.writer.stream_position()?;
        self.xref.size = self.max_id + 1;
        encode::write_xref(&mut self.writer, &self.xref)?;

        let mut trailer = dictionary! { "Size" => self.xref.size as i64, "Root" => self.catalog_id };
        if let Some(info_id) = info_id {
            trailer.set("Info", info_id);
        }
        writeln!(self.writer, "trailer")?;
        encode::write_dictionary(&mut self.writer, &trailer)?;
        writeln!(self.writer, "\nstartxref")?;
        writeln!(self.writer, "{xref_start}")?;
        write!(self.writer, "%%EOF")?;

        self.writer.flush()?;
        Ok(self.writer)
    }
}

mod encode {
    use super::*;
    use lopdf::StringFormat;

    pub fn write_indirect_object<W: Write + Seek>(
        writer: &mut W,
        id: ObjectId,
        object: &Object,
        xref: &mut Xref,
    ) -> io::Result<()> {
        let offset = writer.stream_position()?;
        xref.insert(
            id.0,
            XrefEntry::Normal {
                offset: offset as u32,
                generation: id.1,
            },
        );
        writeln!(writer, "{} {} obj", id.0, id.1)?;
        write_object(writer, object)?;
        writeln!(writer, "\nendobj")
    }

    pub fn write_object(writer: &mut dyn Write, object: &Object) -> io::Result<()> {
        match object {
            Object::Null => writer.write_all(b"null"),
            Object::Boolean(b) => writer.write_all(if *b { b"true" } else { b"false" }),
            Object::Integer(i) => write!(writer, "{i}"),
            Object::Real(r) => write!(writer, "{r:.3}"),
            Object::Name(n) => {
                writer.write_all(b"/")?;
                writer.write_all(n)
            }
            Object::String(s, StringFormat::Literal) => {
                writer.write_all(b"(")?;
                for &byte in s {
                    if matches!(byte, b'(' | b')' | b'\\') {
                        writer.write_all(b"\\")?;
                    }
                    writer.write_all(&[byte])?;
                }
                writer.write_all(b")")
            }
            Object::String(s, StringFormat::Hexadecimal) => {
                writer.write_all(b"<")?;
                for byte in s {
                    write!(writer, "{byte:02X}")?;
                }
                writer.write_all(b">")
            }
            Object::Array(items) => {
                writer.write_all(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writer.write_all(b" ")?;
                    }
                    write_object(writer, item)?;
                }
                writer.write_all(b"]")
            }
            Object::Dictionary(dict) => write_dictionary(writer, dict),
            Object::Stream(stream) => {
                let mut dict = stream.dict.clone();
                dict.set("Length", stream.content.len() as i64);
                write_dictionary(writer, &dict)?;
                writer.write_all(b"\nstream\n")?;
                writer.write_all(&stream.content)?;
                writer.write_all(b"\nendstream")
            }
            Object::Reference(id) => write!(writer, "{} {} R", id.0, id.1),
        }
    }

    pub fn write_dictionary(writer: &mut dyn Write, dict: &Dictionary) -> io::Result<()> {
        writer.write_all(b"<<")?;
        let sorted: BTreeMap<_, _> = dict.iter().collect();
        for (key, value) in sorted {
            writer.write_all(b"/")?;
            writer.write_all(key)?;
            writer.write_all(b" ")?;
            write_object(writer, value)?;
            writer.write_all(b" ")?;
        }
        writer.write_all(b">>")
    }

    /// One subsection covering every id below `xref.size`; ids that were
    /// handed out but never written are listed as free.
    pub fn write_xref<W: Write>(writer: &mut W, xref: &Xref) -> io::Result<()> {
        writeln!(writer, "xref")?;
        writeln!(writer, "0 {}", xref.size)?;
        writeln!(writer, "0000000000 65535 f ")?;
        for id in 1..xref.size {
            match xref.entries.get(&id) {
                Some(XrefEntry::Normal { offset, generation }) => {
                    writeln!(writer, "{offset:010} {generation:05} n ")?
                }
                _ => writeln!(writer, "0000000000 65535 f ")?,
            }
        }
        Ok(())
    }
}
