use std::sync::{Arc, Once};

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};

use crate::{
    negative_space_geojson, render_lanes_geojson, LaneStyleTable, NegativeSpace, RenderOptions,
};

static START: Once = Once::new();

// Callers block on sending once this many requests are waiting
const QUEUE_SIZE: usize = 16;

enum Request {
    RenderLanes {
        input: String,
        lanes: String,
        reply: oneshot::Sender<Result<String>>,
    },
    NegativeSpace {
        input: String,
        reply: oneshot::Sender<Result<String>>,
    },
}

/// Answers GeoJSON requests on a background task. Cloning is cheap; every clone talks to the same
/// task, which stops once all of them are dropped.
#[derive(Clone)]
pub struct Backend {
    tx: mpsc::Sender<Request>,
}

struct Worker {
    styles: Arc<LaneStyleTable>,
    opts: Arc<RenderOptions>,
    negative_space: Arc<dyn NegativeSpace>,
}

impl Backend {
    /// Starts the background task. Must be called from within a tokio runtime.
    pub fn spawn(
        styles: LaneStyleTable,
        opts: RenderOptions,
        negative_space: Arc<dyn NegativeSpace>,
    ) -> Backend {
        START.call_once(|| {
            abstutil::logger::setup();
        });

        let (tx, rx) = mpsc::channel(QUEUE_SIZE);
        let worker = Worker {
            styles: Arc::new(styles),
            opts: Arc::new(opts),
            negative_space,
        };
        tokio::spawn(worker.run(rx));
        Backend { tx }
    }

    /// Takes GeoJSON with one `LineString` and a lane spec, and returns a `FeatureCollection` with
    /// one polygon per lane.
    pub async fn render_lanes(&self, input: String, lanes: String) -> Result<String> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::RenderLanes {
            input,
            lanes,
            reply,
        })
        .await?;
        rx.await?
    }

    /// Takes GeoJSON with one `LineString`, and returns a `FeatureCollection` of negative space
    /// polygons along it.
    pub async fn get_negative_space(&self, input: String) -> Result<String> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::NegativeSpace { input, reply }).await?;
        rx.await?
    }

    async fn send(&self, req: Request) -> Result<()> {
        if self.tx.send(req).await.is_err() {
            bail!("The backend has stopped");
        }
        Ok(())
    }
}

impl Worker {
    async fn run(self, mut rx: mpsc::Receiver<Request>) {
        while let Some(req) = rx.recv().await {
            match req {
                Request::RenderLanes {
                    input,
                    lanes,
                    reply,
                } => {
                    let styles = self.styles.clone();
                    let opts = self.opts.clone();
                    let result = flatten(
                        tokio::task::spawn_blocking(move || {
                            render_lanes_geojson(&input, &lanes, &styles, &opts)
                        })
                        .await,
                    );
                    if let Err(ref err) = result {
                        error!("render_lanes failed: {}", err);
                    }
                    // The caller may have given up waiting
                    let _ = reply.send(result);
                }
                Request::NegativeSpace { input, reply } => {
                    let negative_space = self.negative_space.clone();
                    let result = flatten(
                        tokio::task::spawn_blocking(move || {
                            negative_space_geojson(&input, negative_space.as_ref())
                        })
                        .await,
                    );
                    if let Err(ref err) = result {
                        error!("get_negative_space failed: {}", err);
                    }
                    let _ = reply.send(result);
                }
            }
        }
        debug!("Backend shutting down");
    }
}

fn flatten(result: Result<Result<String>, tokio::task::JoinError>) -> Result<String> {
    match result {
        Ok(result) => result,
        Err(err) => bail!("The backend task crashed: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use geojson::GeoJson;

    use geom::{Distance, LonLat};

    use super::*;
    use crate::{LaneError, SpacePolygon};

    struct Stub;

    impl NegativeSpace for Stub {
        fn calculate(&self, route: &[LonLat]) -> Result<Vec<SpacePolygon>> {
            // One triangle per route point, so the test can see the route made it through
            Ok(route
                .iter()
                .map(|pt| SpacePolygon {
                    exterior: vec![
                        *pt,
                        LonLat::new(pt.x() + 0.001, pt.y()),
                        LonLat::new(pt.x(), pt.y() + 0.001),
                        *pt,
                    ],
                    width: Distance::meters(7.0),
                })
                .collect())
        }
    }

    const ROUTE: &str = r#"{
        "type": "Feature",
        "properties": {},
        "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [0.0, 0.001]]}
    }"#;

    fn backend() -> Backend {
        Backend::spawn(
            LaneStyleTable::route_overlay(),
            RenderOptions::default(),
            Arc::new(Stub),
        )
    }

    fn num_features(raw: &str) -> usize {
        match raw.parse::<GeoJson>().unwrap() {
            GeoJson::FeatureCollection(collection) => collection.features.len(),
            _ => panic!("Not a FeatureCollection: {}", raw),
        }
    }

    #[tokio::test]
    async fn answers_requests() {
        let backend = backend();
        let lanes = backend
            .render_lanes(ROUTE.to_string(), "sd|ds".to_string())
            .await
            .unwrap();
        assert_eq!(num_features(&lanes), 5);

        let space = backend
            .get_negative_space(ROUTE.to_string())
            .await
            .unwrap();
        assert_eq!(num_features(&space), 2);
    }

    #[tokio::test]
    async fn surfaces_errors() {
        let backend = backend();
        let err = backend
            .render_lanes(ROUTE.to_string(), "sq".to_string())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LaneError>(),
            Some(LaneError::InvalidLaneCode { code: 'q', .. })
        ));

        assert!(backend
            .get_negative_space("{}".to_string())
            .await
            .is_err());

        // The worker survives failed requests
        let lanes = backend
            .render_lanes(ROUTE.to_string(), "b".to_string())
            .await
            .unwrap();
        assert_eq!(num_features(&lanes), 1);
    }

    #[tokio::test]
    async fn concurrent_callers() {
        let backend = backend();
        let mut handles = Vec::new();
        for lanes in ["s", "sc", "scb", "scbd"] {
            let backend = backend.clone();
            handles.push(tokio::spawn(async move {
                let output = backend
                    .render_lanes(ROUTE.to_string(), lanes.to_string())
                    .await
                    .unwrap();
                (lanes.len(), num_features(&output))
            }));
        }
        for handle in handles {
            let (expected, actual) = handle.await.unwrap();
            assert_eq!(expected, actual);
        }
    }
}
