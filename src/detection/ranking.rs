use crate::detection::contours::{bounding_rect, contour_area};
use crate::models::DetectedObject;
use imageproc::point::Point;

/// Turn one contour into an object, or `None` if it is below `min_area`
pub fn to_object(points: &[Point<i32>], min_area: f64) -> Option<DetectedObject> {
    let area = contour_area(points);
    if area < min_area {
        return None;
    }
    let (x, y, width, height) = bounding_rect(points)?;
    Some(DetectedObject::new(x, y, width, height, area))
}

/// Filter contours by area and order them largest first.
///
/// The sort is stable, so equal areas keep the order the contours were given in.
pub fn rank_objects<'a, I>(contours: I, min_area: f64) -> Vec<DetectedObject>
where
    I: IntoIterator<Item = &'a [Point<i32>]>,
{
    let mut objects: Vec<DetectedObject> = contours
        .into_iter()
        .filter_map(|points| to_object(points, min_area))
        .collect();

    objects.sort_by(|a, b| b.area.total_cmp(&a.area));
    objects
}
