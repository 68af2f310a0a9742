//! Content stream interpretation.
//!
//! Walks a page's operations tracking the graphics and text state, and
//! produces the page geometry the extractors work on: one positioned char
//! per glyph code and the axis-aligned edges of painted paths. Output
//! coordinates use a top-left origin relative to the page's MediaBox.

use std::collections::HashMap;

use super::backend::{
    ContentOp, FontMetrics, PageBox, PageId, PdfBackend, PdfValue, TextDecoder,
};
use super::geometry::{Char, Edge};

/// Chars and edges of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageGeometry {
    pub chars: Vec<Char>,
    pub edges: Vec<Edge>,
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Build a matrix from its six components.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Pure translation.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self`, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Map a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    fn from_operands(op: &ContentOp) -> Option<Matrix> {
        Some(Matrix::new(
            op.number(0)?,
            op.number(1)?,
            op.number(2)?,
            op.number(3)?,
            op.number(4)?,
            op.number(5)?,
        ))
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Text state parameters, saved and restored with the graphics state.
#[derive(Debug, Clone, PartialEq)]
struct TextState {
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scaling: f64,
    leading: f64,
    rise: f64,
    font: Vec<u8>,
    font_size: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
            font: Vec::new(),
            font_size: 12.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

/// Straight segments of the path under construction, in user space.
#[derive(Debug, Default)]
struct PathBuilder {
    segments: Vec<((f64, f64), (f64, f64))>,
    current: Option<(f64, f64)>,
    subpath_start: Option<(f64, f64)>,
}

impl PathBuilder {
    fn move_to(&mut self, p: (f64, f64)) {
        self.current = Some(p);
        self.subpath_start = Some(p);
    }

    fn line_to(&mut self, p: (f64, f64)) {
        if let Some(from) = self.current {
            self.segments.push((from, p));
        }
        self.current = Some(p);
    }

    fn curve_to(&mut self, end: (f64, f64)) {
        self.current = Some(end);
    }

    fn close(&mut self) {
        if let (Some(from), Some(start)) = (self.current, self.subpath_start) {
            if from != start {
                self.segments.push((from, start));
            }
            self.current = Some(start);
        }
    }

    fn rectangle(&mut self, corners: [(f64, f64); 4]) {
        for i in 0..4 {
            self.segments.push((corners[i], corners[(i + 1) % 4]));
        }
        self.current = Some(corners[0]);
        self.subpath_start = Some(corners[0]);
    }

    fn take(&mut self) -> Vec<((f64, f64), (f64, f64))> {
        self.current = None;
        self.subpath_start = None;
        std::mem::take(&mut self.segments)
    }
}

/// Largest deviation for a segment to count as axis-aligned.
const AXIS_EPSILON: f64 = 1e-3;

/// Interprets the content of one page.
pub struct ContentInterpreter<'a, B: PdfBackend> {
    backend: &'a B,
    page: PageId,
    media_box: PageBox,
    fonts: HashMap<Vec<u8>, FontMetrics>,
    decoders: HashMap<Vec<u8>, TextDecoder<'a>>,
    fallback_font: FontMetrics,
}

impl<'a, B: PdfBackend> ContentInterpreter<'a, B> {
    /// Prepare interpretation of `page`.
    pub fn new(
        backend: &'a B,
        page: PageId,
        media_box: PageBox,
        fonts: HashMap<Vec<u8>, FontMetrics>,
    ) -> Self {
        let decoders = fonts
            .keys()
            .map(|name| (name.clone(), backend.text_decoder(page, name)))
            .collect();
        Self {
            backend,
            page,
            media_box,
            fonts,
            decoders,
            fallback_font: FontMetrics::fallback(),
        }
    }

    /// Run the operations and collect page geometry.
    pub fn run(&self, operations: &[ContentOp]) -> PageGeometry {
        let mut geometry = PageGeometry::default();
        let mut state = GraphicsState::default();
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut path = PathBuilder::default();
        let mut text_matrix = Matrix::IDENTITY;
        let mut line_matrix = Matrix::IDENTITY;

        for op in operations {
            match op.operator.as_str() {
                // Graphics state
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(op) {
                        state.ctm = m.multiply(&state.ctm);
                    }
                }

                // Path construction
                "m" => {
                    if let (Some(x), Some(y)) = (op.number(0), op.number(1)) {
                        path.move_to(state.ctm.apply(x, y));
                    }
                }
                "l" => {
                    if let (Some(x), Some(y)) = (op.number(0), op.number(1)) {
                        path.line_to(state.ctm.apply(x, y));
                    }
                }
                "c" => {
                    if let (Some(x), Some(y)) = (op.number(4), op.number(5)) {
                        path.curve_to(state.ctm.apply(x, y));
                    }
                }
                "v" | "y" => {
                    if let (Some(x), Some(y)) = (op.number(2), op.number(3)) {
                        path.curve_to(state.ctm.apply(x, y));
                    }
                }
                "h" => path.close(),
                "re" => {
                    if let (Some(x), Some(y), Some(w), Some(h)) =
                        (op.number(0), op.number(1), op.number(2), op.number(3))
                    {
                        let ctm = state.ctm;
                        path.rectangle([
                            ctm.apply(x, y),
                            ctm.apply(x + w, y),
                            ctm.apply(x + w, y + h),
                            ctm.apply(x, y + h),
                        ]);
                    }
                }

                // Path painting
                "S" | "f" | "F" | "f*" | "B" | "B*" => {
                    self.emit_edges(path.take(), &mut geometry.edges);
                }
                "s" | "b" | "b*" => {
                    path.close();
                    self.emit_edges(path.take(), &mut geometry.edges);
                }
                "n" => {
                    path.take();
                }

                // Text objects and state
                "BT" => {
                    text_matrix = Matrix::IDENTITY;
                    line_matrix = Matrix::IDENTITY;
                }
                "ET" => {}
                "Tc" => {
                    if let Some(v) = op.number(0) {
                        state.text.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(v) = op.number(0) {
                        state.text.word_spacing = v;
                    }
                }
                "Tz" => {
                    if let Some(v) = op.number(0) {
                        state.text.horizontal_scaling = v / 100.0;
                    }
                }
                "TL" => {
                    if let Some(v) = op.number(0) {
                        state.text.leading = v;
                    }
                }
                "Ts" => {
                    if let Some(v) = op.number(0) {
                        state.text.rise = v;
                    }
                }
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        state.text.font = name.clone();
                    }
                    if let Some(size) = op.number(1) {
                        state.text.font_size = size;
                    }
                }

                // Text positioning
                "Td" | "TD" => {
                    if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                        if op.operator == "TD" {
                            state.text.leading = -ty;
                        }
                        line_matrix = Matrix::translation(tx, ty).multiply(&line_matrix);
                        text_matrix = line_matrix;
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(op) {
                        line_matrix = m;
                        text_matrix = m;
                    }
                }
                "T*" => {
                    line_matrix =
                        Matrix::translation(0.0, -state.text.leading).multiply(&line_matrix);
                    text_matrix = line_matrix;
                }

                // Text showing
                "Tj" => {
                    if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                        self.show(bytes, &state, &mut text_matrix, &mut geometry.chars);
                    }
                }
                "TJ" => {
                    if let Some(PdfValue::Array(items)) = op.operands.first() {
                        for item in items {
                            match item {
                                PdfValue::Str(bytes) => {
                                    self.show(bytes, &state, &mut text_matrix, &mut geometry.chars)
                                }
                                other => {
                                    if let Some(adjust) = other.as_number() {
                                        let t = &state.text;
                                        let tx = -adjust / 1000.0
                                            * t.font_size
                                            * t.horizontal_scaling;
                                        text_matrix =
                                            Matrix::translation(tx, 0.0).multiply(&text_matrix);
                                    }
                                }
                            }
                        }
                    }
                }
                "'" | "\"" => {
                    let text_index = if op.operator == "\"" {
                        if let (Some(aw), Some(ac)) = (op.number(0), op.number(1)) {
                            state.text.word_spacing = aw;
                            state.text.char_spacing = ac;
                        }
                        2
                    } else {
                        0
                    };
                    line_matrix =
                        Matrix::translation(0.0, -state.text.leading).multiply(&line_matrix);
                    text_matrix = line_matrix;
                    if let Some(PdfValue::Str(bytes)) = op.operands.get(text_index) {
                        self.show(bytes, &state, &mut text_matrix, &mut geometry.chars);
                    }
                }
                _ => {}
            }
        }

        geometry
    }

    /// Emit one char per glyph code of `bytes` and advance the text matrix.
    fn show(
        &self,
        bytes: &[u8],
        state: &GraphicsState,
        text_matrix: &mut Matrix,
        out: &mut Vec<Char>,
    ) {
        let t = &state.text;
        let font = self.fonts.get(&t.font).unwrap_or(&self.fallback_font);
        let code_len = if font.two_byte { 2 } else { 1 };
        let codes: Vec<&[u8]> = bytes.chunks(code_len).collect();
        let glyph_texts = self.glyph_texts(&t.font, bytes, &codes);

        for (code_bytes, text) in codes.iter().zip(glyph_texts) {
            let code = code_bytes
                .iter()
                .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
            let w0 = font.width(code) / 1000.0;

            let render = Matrix::new(
                t.font_size * t.horizontal_scaling,
                0.0,
                0.0,
                t.font_size,
                0.0,
                t.rise,
            )
            .multiply(text_matrix)
            .multiply(&state.ctm);

            let (x, y) = (render.e, render.f);
            let size = (render.c * render.c + render.d * render.d).sqrt();
            let advance = w0 * (render.a * render.a + render.b * render.b).sqrt();

            let mb = &self.media_box;
            let left = x - mb.x0;
            out.push(Char::new(
                text,
                left.min(left + advance),
                mb.y1 - (y + size * 0.8),
                left.max(left + advance),
                mb.y1 - (y - size * 0.2),
            ));

            let word_spacing = if code_len == 1 && code == 32 {
                t.word_spacing
            } else {
                0.0
            };
            let tx = (w0 * t.font_size + t.char_spacing + word_spacing) * t.horizontal_scaling;
            *text_matrix = Matrix::translation(tx, 0.0).multiply(text_matrix);
        }
    }

    /// Decoded text of each glyph code.
    ///
    /// The whole string is decoded once; when that yields one char per code
    /// the chars are paired with the codes, otherwise codes are decoded one
    /// by one.
    fn glyph_texts(&self, font: &[u8], bytes: &[u8], codes: &[&[u8]]) -> Vec<String> {
        let decode = |data: &[u8]| match self.decoders.get(font) {
            Some(decoder) => decoder(data),
            None => self.backend.decode_text(self.page, font, data),
        };
        let decoded = decode(bytes);
        if decoded.chars().count() == codes.len() {
            return decoded.chars().map(String::from).collect();
        }
        codes.iter().map(|&code| decode(code)).collect()
    }

    /// Turn the axis-aligned segments of a painted path into edges.
    fn emit_edges(&self, segments: Vec<((f64, f64), (f64, f64))>, out: &mut Vec<Edge>) {
        let mb = &self.media_box;
        for ((x0, y0), (x1, y1)) in segments {
            let (ax, ay) = (x0 - mb.x0, mb.y1 - y0);
            let (bx, by) = (x1 - mb.x0, mb.y1 - y1);
            if (ay - by).abs() < AXIS_EPSILON {
                out.push(Edge::horizontal(ax, bx, ay));
            } else if (ax - bx).abs() < AXIS_EPSILON {
                out.push(Edge::vertical(ax, ay, by));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::pdf::geometry::Orientation;
    use std::cell::Cell;
    use std::collections::BTreeMap;

    /// Backend stub decoding bytes as Latin-1 text.
    struct StubBackend;

    impl PdfBackend for StubBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::new()
        }

        fn media_box(&self, _page: PageId) -> PageBox {
            PageBox::LETTER
        }

        fn page_fonts(&self, _page: PageId) -> Result<HashMap<Vec<u8>, FontMetrics>> {
            Ok(HashMap::new())
        }

        fn page_content(&self, _page: PageId) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(Vec::new())
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            bytes.iter().map(|&b| b as char).collect()
        }
    }

    /// Latin-1 backend counting how often font encodings are resolved.
    #[derive(Default)]
    struct CountingBackend {
        resolved: Cell<usize>,
    }

    impl PdfBackend for CountingBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::new()
        }

        fn media_box(&self, _page: PageId) -> PageBox {
            PageBox::LETTER
        }

        fn page_fonts(&self, _page: PageId) -> Result<HashMap<Vec<u8>, FontMetrics>> {
            Ok(HashMap::new())
        }

        fn page_content(&self, _page: PageId) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(Vec::new())
        }

        fn decode_text(&self, page: PageId, font: &[u8], bytes: &[u8]) -> String {
            self.text_decoder(page, font)(bytes)
        }

        fn text_decoder<'s>(&'s self, _page: PageId, _font: &[u8]) -> TextDecoder<'s> {
            self.resolved.set(self.resolved.get() + 1);
            Box::new(|bytes: &[u8]| bytes.iter().map(|&b| b as char).collect::<String>())
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn num(v: f64) -> PdfValue {
        PdfValue::Real(v)
    }

    fn interpreter<B: PdfBackend>(backend: &B) -> ContentInterpreter<'_, B> {
        let mut fonts = HashMap::new();
        fonts.insert(
            b"F1".to_vec(),
            FontMetrics {
                base_font: "Courier".into(),
                two_byte: false,
                first_char: 0,
                widths: Vec::new(),
                cid_widths: HashMap::new(),
                default_width: 600.0,
            },
        );
        ContentInterpreter::new(backend, (1, 0), PageBox::LETTER, fonts)
    }

    #[test]
    fn test_matrix_multiply_order() {
        let scale = Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = Matrix::translation(10.0, 20.0);
        assert_eq!(scale.multiply(&shift).apply(1.0, 1.0), (12.0, 22.0));
        assert_eq!(shift.multiply(&scale).apply(1.0, 1.0), (22.0, 42.0));
    }

    #[test]
    fn test_chars_positioned_per_glyph() {
        let backend = StubBackend;
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            op("Td", vec![num(72.0), num(700.0)]),
            op("Tj", vec![PdfValue::Str(b"AB".to_vec())]),
            op("ET", vec![]),
        ];
        let geometry = interpreter(&backend).run(&ops);
        assert_eq!(geometry.chars.len(), 2);

        let a = &geometry.chars[0];
        assert_eq!(a.text, "A");
        assert!((a.x0 - 72.0).abs() < 1e-9);
        assert!((a.x1 - 78.0).abs() < 1e-9);
        assert!((a.top - (792.0 - 708.0)).abs() < 1e-9);
        assert!((a.bottom - (792.0 - 698.0)).abs() < 1e-9);

        let b = &geometry.chars[1];
        assert!((b.x0 - 78.0).abs() < 1e-9);
    }

    #[test]
    fn test_tj_adjustment_moves_next_glyph() {
        let backend = StubBackend;
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            op(
                "TJ",
                vec![PdfValue::Array(vec![
                    PdfValue::Str(b"A".to_vec()),
                    PdfValue::Integer(-1000),
                    PdfValue::Str(b"B".to_vec()),
                ])],
            ),
        ];
        let geometry = interpreter(&backend).run(&ops);
        assert!((geometry.chars[1].x0 - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_leading_and_next_line() {
        let backend = StubBackend;
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            op("TD", vec![num(0.0), num(-14.0)]),
            op("T*", vec![]),
            op("Tj", vec![PdfValue::Str(b"x".to_vec())]),
        ];
        let geometry = interpreter(&backend).run(&ops);
        // Two lines down from the origin with a leading of 14.
        let expected_top = 792.0 - (-28.0 + 8.0);
        assert!((geometry.chars[0].top - expected_top).abs() < 1e-9);
    }

    #[test]
    fn test_rectangle_and_lines_become_edges() {
        let backend = StubBackend;
        let ops = vec![
            op("re", vec![num(50.0), num(600.0), num(200.0), num(100.0)]),
            op("S", vec![]),
            op("m", vec![num(0.0), num(0.0)]),
            op("l", vec![num(100.0), num(100.0)]),
            op("S", vec![]),
            op("m", vec![num(10.0), num(10.0)]),
            op("l", vec![num(10.0), num(50.0)]),
            op("n", vec![]),
        ];
        let geometry = interpreter(&backend).run(&ops);
        assert_eq!(geometry.edges.len(), 4);

        let horizontal: Vec<&Edge> = geometry
            .edges
            .iter()
            .filter(|e| e.orientation == Orientation::Horizontal)
            .collect();
        assert_eq!(horizontal.len(), 2);
        assert!(horizontal.iter().any(|e| e.top == 192.0 && e.x0 == 50.0 && e.x1 == 250.0));
        assert!(horizontal.iter().any(|e| e.top == 92.0));
    }

    #[test]
    fn test_cm_and_state_restore() {
        let backend = StubBackend;
        let ops = vec![
            op("q", vec![]),
            op("cm", vec![num(1.0), num(0.0), num(0.0), num(1.0), num(100.0), num(0.0)]),
            op("m", vec![num(0.0), num(500.0)]),
            op("l", vec![num(50.0), num(500.0)]),
            op("S", vec![]),
            op("Q", vec![]),
            op("m", vec![num(0.0), num(400.0)]),
            op("l", vec![num(50.0), num(400.0)]),
            op("S", vec![]),
        ];
        let geometry = interpreter(&backend).run(&ops);
        assert_eq!(geometry.edges[0].x0, 100.0);
        assert_eq!(geometry.edges[1].x0, 0.0);
    }

    #[test]
    fn test_font_encoding_resolved_once_per_font() {
        let backend = CountingBackend::default();
        let interpreter = interpreter(&backend);
        assert_eq!(backend.resolved.get(), 1);

        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            op("Tj", vec![PdfValue::Str(b"Total".to_vec())]),
            op("Tj", vec![PdfValue::Str(b"Sum".to_vec())]),
            op("ET", vec![]),
        ];
        let geometry = interpreter.run(&ops);
        let text: String = geometry.chars.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(text, "TotalSum");
        assert_eq!(backend.resolved.get(), 1);
    }
}
