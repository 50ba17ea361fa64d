use crate::throttle::bucket::{parse_rate, RateBucket, REFILL_INTERVAL};
use crate::MirrorError;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::{Instant, Sleep};

/// An `AsyncRead` adapter that caps throughput at a fixed bytes-per-second rate
///
/// Each read is served `min(requested, tokens left)`. Once the bucket is
/// drained the reader parks for a full [`REFILL_INTERVAL`], refills, and
/// carries on. This is a coarse per-second throttle, not a smooth one.
///
/// # Example
///
/// ```
/// use site_mirror::throttle::RateLimitedReader;
/// use tokio::io::AsyncReadExt;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source: &[u8] = b"hello";
/// let mut reader = RateLimitedReader::from_rate(source, "1k")?;
/// let mut out = String::new();
/// reader.read_to_string(&mut out).await?;
/// assert_eq!(out, "hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RateLimitedReader<R> {
    inner: R,
    bucket: RateBucket,
    pause: Option<Pin<Box<Sleep>>>,
}

impl<R> RateLimitedReader<R> {
    /// Wraps `inner`, allowing `rate_per_second` bytes per second
    pub fn new(inner: R, rate_per_second: u64) -> Self {
        Self {
            inner,
            bucket: RateBucket::new(rate_per_second),
            pause: None,
        }
    }

    /// Wraps `inner` using a rate string such as `200k` or `2M`
    pub fn from_rate(inner: R, rate: &str) -> Result<Self, MirrorError> {
        Ok(Self::new(inner, parse_rate(rate)?))
    }

    /// The bucket metering this reader
    pub fn bucket(&self) -> &RateBucket {
        &self.bucket
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for RateLimitedReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        if this.bucket.is_empty() {
            let pause = this
                .pause
                .get_or_insert_with(|| Box::pin(tokio::time::sleep(REFILL_INTERVAL)));
            ready!(pause.as_mut().poll(cx));
            this.pause = None;

            let now = Instant::now();
            tracing::trace!(
                "Refilling {} byte bucket after {:?}",
                this.bucket.rate_per_second(),
                now - this.bucket.last_refill()
            );
            this.bucket.refill(now);
        }

        let allowed = this.bucket.available(buf.remaining());
        let read = {
            let mut window = ReadBuf::new(buf.initialize_unfilled_to(allowed));
            ready!(Pin::new(&mut this.inner).poll_read(cx, &mut window))?;
            window.filled().len()
        };

        buf.advance(read);
        this.bucket.consume(read);

        Poll::Ready(Ok(()))
    }
}
