use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A path as an ordered sequence of segments.
///
/// Parsing splits on `/` and drops empty and `.` segments, so `a//b/./c`
/// and `a/b/c` are the same path. The empty path renders as `.`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RulePath {
	segments: Vec<String>,
}

impl RulePath {
	/// Build a path from already split segments.
	pub fn from_segments<I, S>(segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		RulePath {
			segments: segments
				.into_iter()
				.map(Into::into)
				.filter(|s: &String| !s.is_empty() && s != ".")
				.collect(),
		}
	}

	pub fn segments(&self) -> &[String] {
		&self.segments
	}

	pub fn len(&self) -> usize {
		self.segments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// True if `other`'s segments are the first segments of this path.
	pub fn starts_with(&self, other: &RulePath) -> bool {
		self.segments.starts_with(&other.segments)
	}

	/// True if `other`'s segments are the last segments of this path.
	pub fn ends_with(&self, other: &RulePath) -> bool {
		self.segments.ends_with(&other.segments)
	}

	/// This path followed by the segments of `other`.
	pub fn join(&self, other: &RulePath) -> RulePath {
		let mut segments = self.segments.clone();
		segments.extend(other.segments.iter().cloned());
		RulePath { segments }
	}
}

impl FromStr for RulePath {
	type Err = Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(RulePath::from_segments(s.split('/')))
	}
}

impl From<&str> for RulePath {
	fn from(s: &str) -> Self {
		RulePath::from_segments(s.split('/'))
	}
}

impl fmt::Display for RulePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.segments.is_empty() {
			f.write_str(".")
		} else {
			f.write_str(&self.segments.join("/"))
		}
	}
}
