//! Subjects: the values matchers judge.
//!
//! Matchers are polymorphic over arbitrary subject types. The [`Subject`]
//! trait couples an [`Any`] upcast (the handle capability guards dispatch
//! on) with a set of optional protocol views: equality, ordering,
//! container elements, size, text lines, sum-type variant, and callable
//! invocation. A view returning `None` means the subject does not support
//! that protocol; capability guards test the views before an
//! implementation relies on them.
//!
//! Implementations cover the primitives, `String`, `Vec`, `Option`,
//! `Result`, and the [`Thunk`] callable subject. The [`subject!`] macro
//! derives the boilerplate for user types that are `Debug + PartialEq`.

use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::trap;

/// Shared handle to a subject value.
pub type SubjectHandle = Arc<dyn Subject>;

/// Outcome of invoking a callable subject.
#[derive(Debug)]
pub enum Invoked {
    /// The closure returned normally.
    Completed,
    /// The closure raised an error value.
    Raised(SubjectHandle),
    /// The closure panicked.
    Panicked(String),
}

/// A value a matcher can judge.
pub trait Subject: fmt::Debug + Send + Sync + 'static {
    /// Upcast for runtime-type dispatch.
    fn as_any(&self) -> &dyn Any;

    /// Short type name used in capability errors and type checks.
    fn type_label(&self) -> &'static str;

    /// Display form used in report messages.
    ///
    /// Strings and chars render unquoted; everything else renders via
    /// `Debug`.
    fn describe(&self) -> String;

    /// Equality against another subject.
    fn eq_subject(&self, other: &dyn Subject) -> bool;

    /// Integer view; numeric subjects compare across widths through it.
    fn as_int(&self) -> Option<i128> {
        None
    }

    /// Float view.
    fn as_float(&self) -> Option<f64> {
        None
    }

    /// Text view (strings only).
    fn as_text(&self) -> Option<&str> {
        None
    }

    /// Ordering view.
    fn compare(&self, _other: &dyn Subject) -> Option<Ordering> {
        None
    }

    /// Container view: the subject's elements, in order.
    fn elements(&self) -> Option<Vec<SubjectHandle>> {
        None
    }

    /// Sized view.
    fn size(&self) -> Option<usize> {
        None
    }

    /// Line-sequence view: a `String` splits on `\n`; a sequence of
    /// strings is itself.
    fn text_lines(&self) -> Option<Vec<String>> {
        None
    }

    /// Sum-type variant label (`"Some"`, `"None"`, `"Ok"`, `"Err"`).
    fn variant(&self) -> Option<&'static str> {
        None
    }

    /// Callable view: run the subject and report what happened.
    fn invoke(&self) -> Option<Invoked> {
        None
    }
}

/// Strip module paths from a `type_name` string, segment-wise.
///
/// Every `path::` prefix goes, including those inside generic arguments,
/// so `alloc::vec::Vec<alloc::string::String>` renders as `Vec<String>`.
fn display_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut path_start = 0;
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(path_start);
        } else {
            out.push(c);
            if !(c.is_alphanumeric() || c == '_') {
                path_start = out.len();
            }
        }
    }
    out
}

/// Derive a [`Subject`] implementation for a `Debug + PartialEq` type.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Token(u32);
/// litspec::subject!(Token);
/// ```
#[macro_export]
macro_rules! subject {
    ($ty:ty) => {
        impl $crate::Subject for $ty {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn type_label(&self) -> &'static str {
                $crate::subject::label_of::<$ty>()
            }

            fn describe(&self) -> ::std::string::String {
                ::std::format!("{:?}", self)
            }

            fn eq_subject(&self, other: &dyn $crate::Subject) -> bool {
                other
                    .as_any()
                    .downcast_ref::<$ty>()
                    .map_or(false, |o| self == o)
            }
        }
    };
}

/// Short type label helper backing the [`subject!`] macro.
///
/// Labels are interned per `TypeId`, each leaked once, so the computed
/// name satisfies the `&'static str` contract of [`Subject::type_label`].
pub fn label_of<T: 'static>() -> &'static str {
    static LABELS: Lazy<Mutex<HashMap<TypeId, &'static str>>> =
        Lazy::new(|| Mutex::new(HashMap::new()));
    let mut labels = LABELS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *labels
        .entry(TypeId::of::<T>())
        .or_insert_with(|| Box::leak(display_type_name(std::any::type_name::<T>()).into_boxed_str()))
}

macro_rules! int_subjects {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Subject for $ty {
                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn type_label(&self) -> &'static str {
                    stringify!($ty)
                }

                fn describe(&self) -> String {
                    self.to_string()
                }

                fn as_int(&self) -> Option<i128> {
                    Some(*self as i128)
                }

                fn eq_subject(&self, other: &dyn Subject) -> bool {
                    match other.as_int() {
                        Some(i) => (*self as i128) == i,
                        None => other.as_float().map_or(false, |f| (*self as f64) == f),
                    }
                }

                fn compare(&self, other: &dyn Subject) -> Option<Ordering> {
                    match other.as_int() {
                        Some(i) => Some((*self as i128).cmp(&i)),
                        None => other
                            .as_float()
                            .and_then(|f| (*self as f64).partial_cmp(&f)),
                    }
                }
            }
        )*
    };
}

int_subjects!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_subjects {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Subject for $ty {
                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn type_label(&self) -> &'static str {
                    stringify!($ty)
                }

                fn describe(&self) -> String {
                    format!("{:?}", self)
                }

                fn as_float(&self) -> Option<f64> {
                    Some(*self as f64)
                }

                fn eq_subject(&self, other: &dyn Subject) -> bool {
                    let this = *self as f64;
                    match other.as_float() {
                        Some(f) => this == f,
                        None => other.as_int().map_or(false, |i| this == i as f64),
                    }
                }

                fn compare(&self, other: &dyn Subject) -> Option<Ordering> {
                    let this = *self as f64;
                    other
                        .as_float()
                        .or_else(|| other.as_int().map(|i| i as f64))
                        .and_then(|f| this.partial_cmp(&f))
                }
            }
        )*
    };
}

float_subjects!(f32, f64);

impl Subject for bool {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "bool"
    }

    fn describe(&self) -> String {
        self.to_string()
    }

    fn eq_subject(&self, other: &dyn Subject) -> bool {
        other.as_any().downcast_ref::<bool>() == Some(self)
    }
}

impl Subject for char {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "char"
    }

    fn describe(&self) -> String {
        self.to_string()
    }

    fn eq_subject(&self, other: &dyn Subject) -> bool {
        other.as_any().downcast_ref::<char>() == Some(self)
    }

    fn compare(&self, other: &dyn Subject) -> Option<Ordering> {
        other.as_any().downcast_ref::<char>().map(|c| self.cmp(c))
    }
}

impl Subject for String {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "String"
    }

    fn describe(&self) -> String {
        self.clone()
    }

    fn as_text(&self) -> Option<&str> {
        Some(self)
    }

    fn eq_subject(&self, other: &dyn Subject) -> bool {
        other.as_text() == Some(self.as_str())
    }

    fn compare(&self, other: &dyn Subject) -> Option<Ordering> {
        other.as_text().map(|t| self.as_str().cmp(t))
    }

    fn elements(&self) -> Option<Vec<SubjectHandle>> {
        Some(
            self.chars()
                .map(|c| Arc::new(c) as SubjectHandle)
                .collect(),
        )
    }

    fn size(&self) -> Option<usize> {
        Some(self.chars().count())
    }

    fn text_lines(&self) -> Option<Vec<String>> {
        Some(self.lines().map(str::to_string).collect())
    }
}

impl Subject for &'static str {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "str"
    }

    fn describe(&self) -> String {
        (*self).to_string()
    }

    fn as_text(&self) -> Option<&str> {
        Some(self)
    }

    fn eq_subject(&self, other: &dyn Subject) -> bool {
        other.as_text() == Some(*self)
    }

    fn compare(&self, other: &dyn Subject) -> Option<Ordering> {
        other.as_text().map(|t| (*self).cmp(t))
    }

    fn elements(&self) -> Option<Vec<SubjectHandle>> {
        Some(
            self.chars()
                .map(|c| Arc::new(c) as SubjectHandle)
                .collect(),
        )
    }

    fn size(&self) -> Option<usize> {
        Some(self.chars().count())
    }

    fn text_lines(&self) -> Option<Vec<String>> {
        Some(self.lines().map(str::to_string).collect())
    }
}

impl<T: Subject + Clone> Subject for Vec<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "Vec"
    }

    fn describe(&self) -> String {
        let items: Vec<String> = self.iter().map(|e| e.describe()).collect();
        format!("[{}]", items.join(", "))
    }

    fn eq_subject(&self, other: &dyn Subject) -> bool {
        other.as_any().downcast_ref::<Vec<T>>().map_or(false, |o| {
            self.len() == o.len()
                && self
                    .iter()
                    .zip(o.iter())
                    .all(|(a, b)| a.eq_subject(b))
        })
    }

    fn elements(&self) -> Option<Vec<SubjectHandle>> {
        Some(
            self.iter()
                .cloned()
                .map(|e| Arc::new(e) as SubjectHandle)
                .collect(),
        )
    }

    fn size(&self) -> Option<usize> {
        Some(self.len())
    }

    fn text_lines(&self) -> Option<Vec<String>> {
        self.iter()
            .map(|e| e.as_text().map(str::to_string))
            .collect()
    }
}

impl<T: Subject + Clone> Subject for Option<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "Option"
    }

    fn describe(&self) -> String {
        match self {
            Some(v) => format!("Some({})", v.describe()),
            None => "None".to_string(),
        }
    }

    fn eq_subject(&self, other: &dyn Subject) -> bool {
        other
            .as_any()
            .downcast_ref::<Option<T>>()
            .map_or(false, |o| match (self, o) {
                (Some(a), Some(b)) => a.eq_subject(b),
                (None, None) => true,
                _ => false,
            })
    }

    fn elements(&self) -> Option<Vec<SubjectHandle>> {
        Some(
            self.iter()
                .cloned()
                .map(|v| Arc::new(v) as SubjectHandle)
                .collect(),
        )
    }

    fn size(&self) -> Option<usize> {
        Some(if self.is_some() { 1 } else { 0 })
    }

    fn variant(&self) -> Option<&'static str> {
        Some(match self {
            Some(_) => "Some",
            None => "None",
        })
    }
}

impl<T: Subject + Clone, E: Subject + Clone> Subject for Result<T, E> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "Result"
    }

    fn describe(&self) -> String {
        match self {
            Ok(v) => format!("Ok({})", v.describe()),
            Err(e) => format!("Err({})", e.describe()),
        }
    }

    fn eq_subject(&self, other: &dyn Subject) -> bool {
        other
            .as_any()
            .downcast_ref::<Result<T, E>>()
            .map_or(false, |o| match (self, o) {
                (Ok(a), Ok(b)) => a.eq_subject(b),
                (Err(a), Err(b)) => a.eq_subject(b),
                _ => false,
            })
    }

    // Both payloads are exposed as the single element, so the chained
    // containment check reaches `Err` contents as well as `Ok` ones.
    fn elements(&self) -> Option<Vec<SubjectHandle>> {
        Some(match self {
            Ok(v) => vec![Arc::new(v.clone()) as SubjectHandle],
            Err(e) => vec![Arc::new(e.clone()) as SubjectHandle],
        })
    }

    fn size(&self) -> Option<usize> {
        Some(1)
    }

    fn variant(&self) -> Option<&'static str> {
        Some(match self {
            Ok(_) => "Ok",
            Err(_) => "Err",
        })
    }
}

impl Subject for () {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "()"
    }

    fn describe(&self) -> String {
        "()".to_string()
    }

    fn eq_subject(&self, other: &dyn Subject) -> bool {
        other.as_any().is::<()>()
    }
}

/// A type claim used as a matcher target.
///
/// Carries a `TypeId` plus its short name; the type-check and
/// exception-raising matchers compare subjects against it and render the
/// name in their messages.
#[derive(Debug, Clone, Copy)]
pub struct TypeName {
    name: &'static str,
    id: TypeId,
}

impl TypeName {
    /// The claim for type `T`.
    pub fn of<T: 'static>() -> TypeName {
        TypeName {
            name: label_of::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    /// The claimed `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The claimed type's short name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Subject for TypeName {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        self.name
    }

    fn describe(&self) -> String {
        self.name.to_string()
    }

    fn eq_subject(&self, other: &dyn Subject) -> bool {
        other
            .as_any()
            .downcast_ref::<TypeName>()
            .map_or(false, |o| self.id == o.id)
    }
}

/// A raised panic, modeled as an error subject.
///
/// The exception-raising matcher treats a panicking thunk as having
/// raised a `Panicked` value, so `throws::<Panicked>()` matches panics and
/// the nested form can hand the message to a nested matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panicked {
    /// The panic message.
    pub message: String,
}

impl Subject for Panicked {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "Panicked"
    }

    fn describe(&self) -> String {
        format!("panicked: {}", self.message)
    }

    fn eq_subject(&self, other: &dyn Subject) -> bool {
        other
            .as_any()
            .downcast_ref::<Panicked>()
            .map_or(false, |o| self == o)
    }

    fn as_text(&self) -> Option<&str> {
        Some(&self.message)
    }
}

type ThunkBody = dyn Fn() -> Result<(), SubjectHandle> + Send + Sync;

/// A named fallible closure, the subject of the exception-raising matcher.
///
/// Closures are anonymous in Rust, so the label is explicit; it stands in
/// for the callable's name in report messages.
#[derive(Clone)]
pub struct Thunk {
    label: String,
    body: Arc<ThunkBody>,
}

impl Thunk {
    /// A thunk whose body may raise an error value.
    pub fn new<E: Subject>(
        label: impl Into<String>,
        body: impl Fn() -> Result<(), E> + Send + Sync + 'static,
    ) -> Thunk {
        Thunk {
            label: label.into(),
            body: Arc::new(move || body().map_err(|e| Arc::new(e) as SubjectHandle)),
        }
    }

    /// A thunk whose body raises only by panicking.
    pub fn infallible(label: impl Into<String>, body: impl Fn() + Send + Sync + 'static) -> Thunk {
        Thunk {
            label: label.into(),
            body: Arc::new(move || {
                body();
                Ok(())
            }),
        }
    }

    /// The thunk's display label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thunk").field("label", &self.label).finish()
    }
}

impl Subject for Thunk {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "Thunk"
    }

    fn describe(&self) -> String {
        self.label.clone()
    }

    fn eq_subject(&self, _other: &dyn Subject) -> bool {
        false
    }

    fn invoke(&self) -> Option<Invoked> {
        let body = Arc::clone(&self.body);
        Some(match trap::catch(move || body()) {
            Ok(Ok(())) => Invoked::Completed,
            Ok(Err(raised)) => Invoked::Raised(raised),
            Err(trapped) => Invoked::Panicked(trapped.message),
        })
    }
}
