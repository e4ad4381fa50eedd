use serde::Serializer;

/// Shortest decimal text that parses back to the same `f64`.
///
/// Never uses exponent notation, so the output always matches the number
/// grammar shared by lengths, path data and point lists. `-0` becomes `0`.
pub fn fmt_f64(v: f64) -> String {
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v}")
}

pub fn ser_f64_compact<S>(v: &f64, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if !v.is_finite() {
        return Err(serde::ser::Error::custom(format!(
            "non-finite float not allowed in JSON: {v}"
        )));
    }

    // Normalize -0.0 -> 0
    let v = if *v == 0.0 { 0.0 } else { *v };

    // Integers go out as JSON integers (no ".0")
    if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        return s.serialize_i64(v as i64);
    }

    s.serialize_f64(v)
}

pub fn ser_vec_f64_compact<S>(v: &[f64], s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use serde::ser::SerializeSeq;

    let mut seq = s.serialize_seq(Some(v.len()))?;
    for x in v {
        seq.serialize_element(&Compact(*x))?;
    }
    seq.end()
}

struct Compact(f64);

impl serde::Serialize for Compact {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser_f64_compact(&self.0, s)
    }
}
