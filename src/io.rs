//! Binary and text persistence.
//!
//! The binary form is layout-independent: two native-byte-order `i64`
//! dimensions, then `rows * cols` elements in row-major order. A
//! column-major instance transposes on the fly in both directions, so both
//! variants produce and accept identical bytes for identical `(i, j)`
//! contents.

use crate::element::Element;
use crate::error::{MatError, MResult};
use crate::layout::MajorOrder;
use crate::mat::DenseMat;
use std::io::{Read, Write};

impl<A: Element, O: MajorOrder> DenseMat<A, O> {
    /// Write the binary form: `rows`, `cols`, then the elements in
    /// row-major order whatever the in-memory layout.
    pub fn write_to<W: Write>(&self, w: &mut W) -> MResult<()> {
        w.write_all(&(self.rows() as i64).to_ne_bytes())?;
        w.write_all(&(self.cols() as i64).to_ne_bytes())?;
        if self.is_empty() {
            return Ok(());
        }
        let mut row = vec![0u8; self.cols() * A::SIZE];
        for i in 0..self.rows() {
            for j in 0..self.cols() {
                self.at(i, j).to_ne(&mut row[j * A::SIZE..]);
            }
            w.write_all(&row)?;
        }
        Ok(())
    }

    /// Read the binary form back, reallocating to the stored shape and
    /// discarding prior contents. A failed read is not rolled back: the
    /// matrix keeps whatever intermediate reallocated state existed.
    pub fn read_from<R: Read>(&mut self, r: &mut R) -> MResult<()> {
        let mut d = [0u8; 8];
        r.read_exact(&mut d)?;
        let rows = i64::from_ne_bytes(d);
        r.read_exact(&mut d)?;
        let cols = i64::from_ne_bytes(d);
        let rows = usize::try_from(rows).map_err(|_| MatError::BadDim(rows))?;
        let cols = usize::try_from(cols).map_err(|_| MatError::BadDim(cols))?;
        self.realloc(rows, cols)?;
        if self.is_empty() {
            return Ok(());
        }
        let mut row = vec![0u8; cols * A::SIZE];
        for i in 0..rows {
            r.read_exact(&mut row)?;
            for j in 0..cols {
                *self.at_mut(i, j) = A::from_ne(&row[j * A::SIZE..]);
            }
        }
        Ok(())
    }

    /// Write the text form: one line per row, elements space-separated,
    /// no dimension header.
    pub fn write_text<W: Write>(&self, w: &mut W) -> MResult<()> {
        for i in 0..self.rows() {
            for j in 0..self.cols() {
                if j > 0 {
                    write!(w, " ")?;
                }
                write!(w, "{}", self.at(i, j))?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::MatError;
    use crate::mat::{ColMat, RowMat};
    use half::f16;
    use std::io::{Cursor, Seek, SeekFrom};

    #[test]
    fn test_binary_round_trip_same_layout() {
        let mut m = RowMat::<f64>::with_dims(3, 4).unwrap();
        m.fill_seq();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 16 + 12 * 8);

        let mut back = RowMat::<f64>::new();
        back.read_from(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_binary_round_trip_cross_layout() {
        // write a row-major matrix, read it into a column-major one
        let mut m = RowMat::<f64>::with_dims(2, 3).unwrap();
        m.fill(7.0);
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        let mut c = ColMat::<f64>::new();
        c.read_from(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(c.shape(), (2, 3));
        assert_eq!(*c.at(1, 2), 7.0);
        assert_eq!(c, m);
    }

    #[test]
    fn test_both_layouts_write_identical_bytes() {
        let mut r = RowMat::<i32>::with_dims(3, 2).unwrap();
        let mut c = ColMat::<i32>::with_dims(3, 2).unwrap();
        r.fill_seq();
        c.fill_seq();
        let mut br = Vec::new();
        let mut bc = Vec::new();
        r.write_to(&mut br).unwrap();
        c.write_to(&mut bc).unwrap();
        assert_eq!(br, bc);
    }

    #[test]
    fn test_binary_layout() {
        let mut m = RowMat::<i64>::with_dims(1, 2).unwrap();
        *m.at_mut(0, 0) = 10;
        *m.at_mut(0, 1) = -3;
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();
        assert_eq!(&buf[0..8], &1i64.to_ne_bytes());
        assert_eq!(&buf[8..16], &2i64.to_ne_bytes());
        assert_eq!(&buf[16..24], &10i64.to_ne_bytes());
        assert_eq!(&buf[24..32], &(-3i64).to_ne_bytes());
    }

    #[test]
    fn test_truncated_read_fails() {
        let mut m = RowMat::<f32>::with_dims(4, 4).unwrap();
        m.fill(1.0);
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();
        buf.truncate(buf.len() - 5);

        let mut back = RowMat::<f32>::new();
        let err = back.read_from(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, MatError::Io(_)));
        // not rolled back: the reallocated shape stays
        assert_eq!(back.shape(), (4, 4));
    }

    #[test]
    fn test_negative_dimension_fails() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(-2i64).to_ne_bytes());
        buf.extend_from_slice(&3i64.to_ne_bytes());

        let mut back = RowMat::<f64>::new();
        let err = back.read_from(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, MatError::BadDim(-2)));
    }

    #[test]
    fn test_empty_round_trip() {
        let m = ColMat::<f64>::with_dims(0, 7).unwrap();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 16);

        let mut back = ColMat::<f64>::with_dims(2, 2).unwrap();
        back.read_from(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(back.shape(), (0, 7));
        assert!(back.is_empty());
    }

    #[test]
    fn test_f16_round_trip() {
        let mut m = RowMat::<f16>::with_dims(2, 2).unwrap();
        m.fill(f16::from_f32(0.5));
        *m.at_mut(1, 0) = f16::from_f32(-2.25);
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 16 + 4 * 2);

        let mut back = ColMat::<f16>::new();
        back.read_from(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_text_format() {
        let mut m = RowMat::<i32>::with_dims(2, 3).unwrap();
        m.fill_seq();
        let mut buf = Vec::new();
        m.write_text(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "0 1 2\n3 4 5\n");
    }

    #[test]
    fn test_text_format_col_major_reads_the_same() {
        let mut m = ColMat::<i32>::with_dims(2, 2).unwrap();
        m.fill_seq();
        let mut buf = Vec::new();
        m.write_text(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "0 1\n2 3\n");
    }

    #[test]
    fn test_file_round_trip() {
        let mut m = RowMat::<f64>::with_dims(5, 3).unwrap();
        m.fill_seq();

        let mut file = tempfile::tempfile().unwrap();
        m.write_to(&mut file).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let mut back = ColMat::<f64>::new();
        back.read_from(&mut file).unwrap();
        assert_eq!(back, m);
    }
}
