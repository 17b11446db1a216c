use ndarray::Array1;

/// One element of a call [`Signature`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Spec {
    /// A float compared by value (bit pattern, with `-0.0` and NaN normalized).
    Float(u64),

    /// An integer compared by value.
    Int(i128),

    /// A boolean compared by value.
    Bool(bool),

    /// A string compared by value.
    Str(String),

    /// An array compared by shape only.
    Shape(Vec<usize>),

    /// An absent optional argument.
    Absent,

    /// The start of a tuple with the given arity.
    Group(usize),
}

impl Spec {
    fn float(value: f64) -> Self {
        let normalized = if value == 0.0 {
            0.0
        } else if value.is_nan() {
            f64::NAN
        } else {
            value
        };
        Self::Float(normalized.to_bits())
    }
}

/// The structural description of the arguments a function was called with.
///
/// Two calls hit the same compiled form when their tags match and their
/// signatures compare equal. Scalars are part of the signature by value;
/// arrays only by shape, so calling with new array contents reuses the
/// compiled form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature(Vec<Spec>);

impl Signature {
    /// Builds the signature of `args`.
    #[must_use]
    pub fn of<A: Argument + ?Sized>(args: &A) -> Self {
        let mut signature = Self::default();
        args.describe(&mut signature);
        signature
    }

    /// Appends one element.
    pub fn push(&mut self, spec: Spec) {
        self.0.push(spec);
    }

    /// Returns the elements in call order.
    #[must_use]
    pub fn specs(&self) -> &[Spec] {
        &self.0
    }
}

/// A value that can be passed to a wrapped [`Function`](crate::Function).
pub trait Argument {
    /// Appends this value's contribution to `signature`.
    fn describe(&self, signature: &mut Signature);
}

impl<T: Argument + ?Sized> Argument for &T {
    fn describe(&self, signature: &mut Signature) {
        (**self).describe(signature);
    }
}

impl Argument for f64 {
    fn describe(&self, signature: &mut Signature) {
        signature.push(Spec::float(*self));
    }
}

impl Argument for f32 {
    fn describe(&self, signature: &mut Signature) {
        signature.push(Spec::float(f64::from(*self)));
    }
}

macro_rules! int_argument {
    ($($ty:ty),*) => {
        $(
            impl Argument for $ty {
                fn describe(&self, signature: &mut Signature) {
                    signature.push(Spec::Int(i128::from(*self)));
                }
            }
        )*
    };
}

int_argument!(i32, i64, u32, u64);

impl Argument for usize {
    fn describe(&self, signature: &mut Signature) {
        // usize is at most 64 bits on supported targets.
        signature.push(Spec::Int(*self as i128));
    }
}

impl Argument for bool {
    fn describe(&self, signature: &mut Signature) {
        signature.push(Spec::Bool(*self));
    }
}

impl Argument for str {
    fn describe(&self, signature: &mut Signature) {
        signature.push(Spec::Str(self.to_owned()));
    }
}

impl Argument for String {
    fn describe(&self, signature: &mut Signature) {
        self.as_str().describe(signature);
    }
}

impl Argument for [f64] {
    fn describe(&self, signature: &mut Signature) {
        signature.push(Spec::Shape(vec![self.len()]));
    }
}

impl Argument for Vec<f64> {
    fn describe(&self, signature: &mut Signature) {
        self.as_slice().describe(signature);
    }
}

impl Argument for Array1<f64> {
    fn describe(&self, signature: &mut Signature) {
        signature.push(Spec::Shape(self.shape().to_vec()));
    }
}

impl<T: Argument> Argument for Option<T> {
    fn describe(&self, signature: &mut Signature) {
        match self {
            Some(value) => value.describe(signature),
            None => signature.push(Spec::Absent),
        }
    }
}

impl Argument for () {
    fn describe(&self, signature: &mut Signature) {
        signature.push(Spec::Group(0));
    }
}

macro_rules! tuple_argument {
    ($arity:literal; $($name:ident),+) => {
        impl<$($name: Argument),+> Argument for ($($name,)+) {
            #[allow(non_snake_case)]
            fn describe(&self, signature: &mut Signature) {
                let ($($name,)+) = self;
                signature.push(Spec::Group($arity));
                $($name.describe(signature);)+
            }
        }
    };
}

tuple_argument!(1; A);
tuple_argument!(2; A, B);
tuple_argument!(3; A, B, C);
tuple_argument!(4; A, B, C, D);
