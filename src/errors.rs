use std::{error, fmt};

use backtrace::Backtrace;

/// Identifies which pre-sized arena ran out of slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arena {
    Segments,
    Trapezoids,
    QueryNodes,
}

impl fmt::Display for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arena::Segments => write!(f, "segment table"),
            Arena::Trapezoids => write!(f, "trapezoid table"),
            Arena::QueryNodes => write!(f, "query structure"),
        }
    }
}

/// Describes an error which occurred during triangulation
#[derive(Debug)]
#[non_exhaustive]
pub enum TriangulateError {
    /// No vertices were provided at all
    NoVertices,
    /// A contour was encountered with fewer than 3 vertices
    NotEnoughVertices(usize),
    /// One of the pre-sized arenas overflowed. The [Triangulator](crate::Triangulator)
    /// must be created for at least the input's vertex count.
    ArenaOverflow(Arena),
    /// A triangulation precondition was violated (e.g. the polygon is not
    /// simple), or a triangulation bug was encountered.
    InternalError(InternalError),
}

impl TriangulateError {
    #[inline(always)]
    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        TriangulateError::InternalError(InternalError::new(msg))
    }
}

impl error::Error for TriangulateError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::InternalError(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for TriangulateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVertices => write!(f, "Polygon contains no vertices"),
            Self::NotEnoughVertices(vertices) => write!(f, "Contour only contains {} vertices", vertices),
            Self::ArenaOverflow(arena) => write!(f, "Capacity of the {} exceeded", arena),
            Self::InternalError(error) => fmt::Display::fmt(error, f),
        }
    }
}

#[derive(Debug)]
pub struct InternalError {
    pub msg: String,
    pub backtrace: Backtrace,
}

impl InternalError {
    #[cold]
    #[inline(always)]
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            backtrace: Backtrace::new_unresolved(),
        }
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{:?}", self.msg, self.backtrace)
    }
}

impl error::Error for InternalError { }
