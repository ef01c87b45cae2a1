//! Dense two-dimensional matrices over a single contiguous buffer, generic
//! in element type and storage order. [`RowMat`] and [`ColMat`] share one
//! core representation; only the compile-time layout tag differs.

mod element;
mod error;
mod io;
mod layout;
mod mat;
mod storage;

pub use element::Element;
pub use error::{MResult, MatError};
pub use layout::{ColMajor, MajorOrder, RowMajor};
pub use mat::{ColMat, DenseMat, RowMat};

#[macro_export]
macro_rules! mat {
    ($([$($x:expr),* $(,)*]),+ $(,)*) => {{
        $crate::RowMat::from(vec![$([$($x,)*],)*])
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mat_macro() {
        let m = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(*m.at(1, 2), 6.0);
        assert_eq!(m.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_from_nested_rows() {
        let m = RowMat::from(vec![[1, 2], [3, 4], [5, 6]]);
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(*m.at(2, 0), 5);
    }

    #[test]
    fn test_round_trip_into_fresh_matrix() {
        let mut m = RowMat::<f64>::with_dims(2, 3).unwrap();
        m.fill(7.0);
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        let mut c = ColMat::<f64>::with_dims(0, 0).unwrap();
        c.read_from(&mut std::io::Cursor::new(&buf)).unwrap();
        assert_eq!(c.shape(), (2, 3));
        assert_eq!(*c.at(1, 2), 7.0);
        assert_eq!(c, m);
    }
}
