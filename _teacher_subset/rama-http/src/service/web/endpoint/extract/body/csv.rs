use super::BytesRejection;
use crate::Request;
use crate::body::util::BodyExt;
use crate::service::web::extract::FromRequest;
use crate::utils::macros::{composite_http_rejection, define_http_rejection};
use rama_core::bytes::{Buf, Bytes};

pub use crate::service::web::endpoint::response::Csv;

define_http_rejection! {
    #[status = UNSUPPORTED_MEDIA_TYPE]
    #[body = "Csv requests must have `Content-Type: text/csv`"]
    /// Rejection type for [`Csv`]
    /// used if the `Content-Type` header is missing
    /// or its value is not `text/csv`.
    pub struct InvalidCsvContentType;
}

define_http_rejection! {
    #[status = BAD_REQUEST]
    #[body = "Failed to deserialize csv payload"]
    /// Rejection type used if the [`Csv`]
    /// deserialize the payload into the target type.
    pub struct FailedToDeserializeCsv(Error);
}

composite_http_rejection! {
    /// Rejection used for [`Csv`]
    ///
    /// Contains one variant for each way the [`Csv`] extractor
    /// can fail.
    pub enum CsvRejection {
        InvalidCsvContentType,
        FailedToDeserializeCsv,
        BytesRejection,
    }
}

impl<T> FromRequest for Csv<Vec<T>>
where
    T: serde::de::DeserializeOwned + Send + Sync + 'static,
{
    type Rejection = CsvRejection;

    async fn from_request(req: Request) -> Result<Self, Self::Rejection> {
        // Extracted into separate fn so it's only compiled once for all T.
        async fn req_to_csv_bytes(req: Request) -> Result<Bytes, CsvRejection> {
            if !crate::service::web::extract::has_any_content_type(
                req.headers(),
                &[&crate::mime::TEXT_CSV],
            ) {
                return Err(InvalidCsvContentType.into());
            }

            let body = req.into_body();
            let bytes = body.collect().await.map_err(BytesRejection::from_err)?;

            Ok(bytes.to_bytes())
        }

        let b = req_to_csv_bytes(req).await?;
        let mut rdr = csv::Reader::from_reader(b.reader());

        let out: Result<Vec<T>, _> = rdr
            .deserialize()
            .map(|rec| {
                let record: Result<T, _> = rec;
                record
            })
            .collect();

        match out {
            Ok(s) => Ok(Self(s)),
            Err(err) => Err(FailedToDeserializeCsv::from_err(err).into()),
        }
    }
}
